use thiserror::Error;

use super::device::DeviceError;
use super::sink::SinkError;

/// Reasons a sampling run ends before it is asked to stop.
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("failed to query volume: {0}")]
    Query(#[source] DeviceError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("corrective set-volume to {target} failed: {source}")]
    Correction {
        target: u16,
        #[source]
        source: DeviceError,
    },
}
