use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a device or directory implementation.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("soap {} failed with status {}{}: {}", .action, .status, fault_suffix(.fault), .body)]
    Soap {
        action: String,
        status: u16,
        fault: Option<String>,
        body: String,
    },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("device does not expose the {0} service")]
    MissingService(&'static str),

    #[error("network io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

fn fault_suffix(fault: &Option<String>) -> String {
    match fault {
        Some(code) => format!(" (upnp error {code})"),
        None => String::new(),
    }
}

/// A connected media renderer. Only the sampling task talks to it once a run starts.
#[async_trait]
pub trait Device: Send + Sync {
    async fn name(&self) -> Result<String, DeviceError>;
    async fn get_volume(&self) -> Result<u16, DeviceError>;
    async fn set_volume(&self, volume: u16) -> Result<(), DeviceError>;
}

/// A discovered device as presented to the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceListing<H> {
    pub name: String,
    pub handle: H,
}

/// Registry of devices found on the network.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    type Handle: Clone + Send + Sync;
    type Device: Device + 'static;

    async fn list(&self) -> Result<Vec<DeviceListing<Self::Handle>>, DeviceError>;
    async fn connect(&self, handle: &Self::Handle) -> Result<Self::Device, DeviceError>;
}
