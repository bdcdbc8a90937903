pub mod config;
pub mod console;
pub mod kernel;
pub mod services;

// Re-exported for binaries and tests
pub use kernel::sampler::{RunConfig, Sampler};
