use tokio::sync::watch;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::device::Device;
use super::error::SamplerError;
use super::policy::{CorrectionFailure, PunishmentPolicy};
use super::sample::VolumeSample;
use super::sink::LogSink;
use super::time::{Clock, SystemClock, Tick, SAMPLE_PERIOD};

/// Everything a run needs besides the device. Fixed for the lifetime of the run.
pub struct RunConfig<S> {
    pub period: Duration,
    pub policy: PunishmentPolicy,
    pub sink: S,
    pub correction_failure: CorrectionFailure,
}

impl<S: LogSink> RunConfig<S> {
    /// Default period, punishment disabled.
    pub fn new(sink: S) -> Self {
        Self {
            period: SAMPLE_PERIOD,
            policy: PunishmentPolicy::default(),
            sink,
            correction_failure: CorrectionFailure::default(),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_policy(mut self, policy: PunishmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_correction_failure(mut self, correction_failure: CorrectionFailure) -> Self {
        self.correction_failure = correction_failure;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub corrections: u64,
    pub failed_corrections: u64,
}

/// Periodic sample-log-correct loop against a single device.
pub struct Sampler<D, S, C = SystemClock> {
    device: D,
    config: RunConfig<S>,
    clock: C,
    tick: Tick,
    summary: RunSummary,
    state: watch::Sender<SamplerState>,
}

impl<D, S> Sampler<D, S, SystemClock>
where
    D: Device,
    S: LogSink,
{
    pub fn new(device: D, config: RunConfig<S>) -> Self {
        Self::with_clock(device, config, SystemClock)
    }
}

impl<D, S, C> Sampler<D, S, C>
where
    D: Device,
    S: LogSink,
    C: Clock,
{
    pub fn with_clock(device: D, config: RunConfig<S>, clock: C) -> Self {
        let (state, _) = watch::channel(SamplerState::Idle);
        Self {
            device,
            config,
            clock,
            tick: Tick::new(),
            summary: RunSummary::default(),
            state,
        }
    }

    /// Observe lifecycle transitions. Stays readable after the run ends.
    pub fn subscribe(&self) -> watch::Receiver<SamplerState> {
        self.state.subscribe()
    }

    fn transition(&self, next: SamplerState) {
        info!("Sampler {:?} -> {:?}", *self.state.borrow(), next);
        self.state.send_replace(next);
    }

    /// Runs until `cancel` fires or a tick fails.
    ///
    /// The first tick happens one full period after start. Cancellation is only
    /// observed while waiting for the next tick: a tick that has started always
    /// finishes its write before the loop looks at the token again.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<RunSummary, SamplerError> {
        self.transition(SamplerState::Running);
        info!(
            "Sampling every {:?} (punish: {:?})",
            self.config.period, self.config.policy
        );

        let mut ticker = interval_at(Instant::now() + self.config.period, self.config.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let outcome = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Stop requested after {} ticks", self.tick.frame);
                    break Ok(());
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.tick_step().await {
                        error!("Tick {} failed: {}", self.tick.frame, e);
                        break Err(e);
                    }
                }
            }
        };

        self.transition(SamplerState::Stopping);
        drop(ticker);
        self.transition(SamplerState::Stopped);

        outcome.map(|()| self.summary)
    }

    /// One tick: query, append + flush, then maybe punish.
    pub async fn tick_step(&mut self) -> Result<(), SamplerError> {
        self.tick = self.tick.next();
        self.summary.ticks = self.tick.frame;

        let now = self.clock.now();
        let volume = self.device.get_volume().await.map_err(SamplerError::Query)?;
        let sample = VolumeSample::new(now, volume);

        info!("Vol @ {}: {}", sample.formatted_timestamp(), volume);
        self.config.sink.append(&sample)?;

        let Some(target) = self.config.policy.correction_for(volume) else {
            return Ok(());
        };

        warn!(
            "PUNISH: Volume {} exceeded threshold of {}, lowering it to {}",
            volume, self.config.policy.threshold, target
        );
        match self.device.set_volume(target).await {
            Ok(()) => {
                self.summary.corrections += 1;
                Ok(())
            }
            Err(source) => {
                self.summary.failed_corrections += 1;
                match self.config.correction_failure {
                    CorrectionFailure::Continue => {
                        warn!("Corrective set-volume failed, continuing: {}", source);
                        Ok(())
                    }
                    CorrectionFailure::Abort => Err(SamplerError::Correction { target, source }),
                }
            }
        }
    }
}
