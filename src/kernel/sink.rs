use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::sample::VolumeSample;

pub const DEFAULT_LOG_PATH: &str = "./log.csv";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write log row: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush log row: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable destination for samples. Every successful `append` is already flushed.
pub trait LogSink: Send {
    fn append(&mut self, sample: &VolumeSample) -> Result<(), SinkError>;
}

/// Headerless two-column CSV file, opened for append so earlier runs are kept.
pub struct CsvLogSink {
    writer: csv::Writer<File>,
}

impl CsvLogSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open {
                path: path.clone(),
                source,
            })?;

        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        info!("Logging samples to {}", path.display());
        Ok(Self { writer })
    }
}

impl LogSink for CsvLogSink {
    fn append(&mut self, sample: &VolumeSample) -> Result<(), SinkError> {
        self.writer.write_record(sample.record())?;
        self.writer.flush()?;
        Ok(())
    }
}
