use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_THRESHOLD: u16 = 30;
pub const DEFAULT_IDEAL: u16 = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("ideal volume {ideal} is above the punishment threshold {threshold}")]
    IdealAboveThreshold { ideal: u16, threshold: u16 },
}

/// Force-lowers the volume when a sample exceeds `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunishmentPolicy {
    pub enabled: bool,
    pub threshold: u16,
    pub ideal: u16,
}

impl Default for PunishmentPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_THRESHOLD,
            ideal: DEFAULT_IDEAL,
        }
    }
}

impl PunishmentPolicy {
    pub fn enabled(threshold: u16, ideal: u16) -> Self {
        Self {
            enabled: true,
            threshold,
            ideal,
        }
    }

    /// A correction that would raise the volume is a misconfiguration.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.enabled && self.ideal > self.threshold {
            return Err(PolicyError::IdealAboveThreshold {
                ideal: self.ideal,
                threshold: self.threshold,
            });
        }
        Ok(())
    }

    /// Pure decision: the volume to force, if any. Equality never punishes.
    pub fn correction_for(&self, volume: u16) -> Option<u16> {
        if self.enabled && volume > self.threshold {
            Some(self.ideal)
        } else {
            None
        }
    }
}

/// What the sampler does when the corrective set-volume call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionFailure {
    /// Log a warning and keep sampling.
    #[default]
    Continue,
    /// End the run with an error.
    Abort,
}
