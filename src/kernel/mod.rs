//! Sampling core: the tick loop, the punishment rule and shutdown coordination.
//!
//! Nothing in here knows about UPnP. Devices arrive through the traits in
//! [`device`], samples leave through [`sink::LogSink`].

pub mod cancel;
pub mod device;
pub mod error;
pub mod policy;
pub mod sample;
pub mod sampler;
pub mod sink;
pub mod time;
