use chrono::{DateTime, Local};

/// Sortable, second-precision local timestamp used in every log row.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One volume reading. Appended to the log and then dropped; the file is the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeSample {
    pub timestamp: DateTime<Local>,
    pub volume: u16,
}

impl VolumeSample {
    pub fn new(timestamp: DateTime<Local>, volume: u16) -> Self {
        Self { timestamp, volume }
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// `[timestamp, volume]` as written to the log.
    pub fn record(&self) -> [String; 2] {
        [self.formatted_timestamp(), self.volume.to_string()]
    }
}
