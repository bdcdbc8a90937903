//! SSDP discovery and SOAP RenderingControl client for UPnP media renderers.

pub mod description;
pub mod directory;
pub mod interfaces;
pub mod renderer;
pub mod soap;
pub mod ssdp;

pub use directory::{DiscoveryConfig, UpnpDirectory};
pub use interfaces::NetInterface;
pub use renderer::UpnpRenderer;
