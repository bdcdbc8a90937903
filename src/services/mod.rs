pub mod upnp;
