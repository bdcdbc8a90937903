use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;

use crate::kernel::policy::{CorrectionFailure, PolicyError, PunishmentPolicy, DEFAULT_IDEAL, DEFAULT_THRESHOLD};
use crate::kernel::sink::DEFAULT_LOG_PATH;
use crate::services::upnp::ssdp::ST_MEDIA_RENDERER;

/// volwatch - log a UPnP renderer's volume and optionally keep it down
#[derive(Parser, Debug, Clone, Serialize)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// If volume exceeds the threshold, lower it
    #[arg(long)]
    pub punish: bool,

    /// Threshold to use for punishment
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: u16,

    /// Volume to set as punishment
    #[arg(long, default_value_t = DEFAULT_IDEAL)]
    pub ideal: u16,

    /// Seconds between samples
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,

    /// CSV file samples are appended to
    #[arg(long, default_value = DEFAULT_LOG_PATH)]
    pub log_file: PathBuf,

    /// Network interface to search on (skips the interface menu)
    #[arg(long)]
    pub interface: Option<String>,

    /// 1-based device number from the discovery list (skips the device menu)
    #[arg(long)]
    pub device: Option<usize>,

    /// SSDP search target
    #[arg(long, default_value = ST_MEDIA_RENDERER)]
    pub search_target: String,

    /// How long to collect SSDP replies
    #[arg(long, default_value_t = 3000)]
    pub discovery_timeout_ms: u64,

    /// Per-request timeout for description and SOAP calls
    #[arg(long, default_value_t = 5000)]
    pub request_timeout_ms: u64,

    /// Stop sampling when a corrective set-volume fails
    #[arg(long)]
    pub strict_correction: bool,
}

impl Cli {
    /// The validated punishment policy.
    pub fn policy(&self) -> Result<PunishmentPolicy, PolicyError> {
        let policy = PunishmentPolicy {
            enabled: self.punish,
            threshold: self.threshold,
            ideal: self.ideal,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn correction_failure(&self) -> CorrectionFailure {
        if self.strict_correction {
            CorrectionFailure::Abort
        } else {
            CorrectionFailure::Continue
        }
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Effective settings as pretty JSON, printed at startup.
    pub fn dump(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unprintable config: {e}>"))
    }
}
