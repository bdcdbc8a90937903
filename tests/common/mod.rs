#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use volwatch::kernel::device::{Device, DeviceDirectory, DeviceError, DeviceListing};
use volwatch::kernel::sample::VolumeSample;
use volwatch::kernel::sink::{LogSink, SinkError};
use volwatch::kernel::time::Clock;

/// Replays scripted volumes; the last one repeats forever.
#[derive(Clone, Debug, Default)]
pub struct FakeDevice {
    pub name: String,
    volumes: Arc<Mutex<VecDeque<u16>>>,
    last: Arc<Mutex<u16>>,
    pub sets: Arc<Mutex<Vec<u16>>>,
    pub queries: Arc<Mutex<u32>>,
    pub fail_get: bool,
    pub fail_set: bool,
    pub query_delay: Option<Duration>,
}

impl FakeDevice {
    pub fn with_volumes(volumes: &[u16]) -> Self {
        Self {
            name: "Fake Renderer".to_string(),
            volumes: Arc::new(Mutex::new(volumes.iter().copied().collect())),
            ..Default::default()
        }
    }

    pub fn set_calls(&self) -> Vec<u16> {
        self.sets.lock().unwrap().clone()
    }
}

#[async_trait]
impl Device for FakeDevice {
    async fn name(&self) -> Result<String, DeviceError> {
        Ok(self.name.clone())
    }

    async fn get_volume(&self) -> Result<u16, DeviceError> {
        *self.queries.lock().unwrap() += 1;
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_get {
            return Err(DeviceError::Other("renderer unreachable".to_string()));
        }
        let mut last = self.last.lock().unwrap();
        if let Some(v) = self.volumes.lock().unwrap().pop_front() {
            *last = v;
        }
        Ok(*last)
    }

    async fn set_volume(&self, volume: u16) -> Result<(), DeviceError> {
        self.sets.lock().unwrap().push(volume);
        if self.fail_set {
            return Err(DeviceError::Other("set rejected".to_string()));
        }
        Ok(())
    }
}

/// Keeps samples in memory, shared with the test body.
#[derive(Clone, Default)]
pub struct MemorySink {
    pub samples: Arc<Mutex<Vec<VolumeSample>>>,
}

impl MemorySink {
    pub fn rows(&self) -> Vec<VolumeSample> {
        self.samples.lock().unwrap().clone()
    }
}

impl LogSink for MemorySink {
    fn append(&mut self, sample: &VolumeSample) -> Result<(), SinkError> {
        self.samples.lock().unwrap().push(*sample);
        Ok(())
    }
}

/// Wall clock derived from tokio time, so paused tests get exact timestamps.
pub struct TokioClock {
    base: DateTime<Local>,
    start: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(base: DateTime<Local>) -> Self {
        Self {
            base,
            start: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Local> {
        self.base + chrono::Duration::from_std(self.start.elapsed()).unwrap()
    }
}

pub fn noon() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap()
}

/// Directory over a fixed set of fake devices; handles are indices.
pub struct FakeDirectory {
    pub devices: Vec<FakeDevice>,
}

#[async_trait]
impl DeviceDirectory for FakeDirectory {
    type Handle = usize;
    type Device = FakeDevice;

    async fn list(&self) -> Result<Vec<DeviceListing<usize>>, DeviceError> {
        Ok(self
            .devices
            .iter()
            .enumerate()
            .map(|(handle, d)| DeviceListing {
                name: d.name.clone(),
                handle,
            })
            .collect())
    }

    async fn connect(&self, handle: &usize) -> Result<FakeDevice, DeviceError> {
        self.devices
            .get(*handle)
            .cloned()
            .ok_or_else(|| DeviceError::Other(format!("no device {handle}")))
    }
}
