//! Periodic publisher
//!
//! On every tick: publish the target, then the candidates. Fire-and-forget;
//! ticks that find no subscribers are still counted as emitted.

use bus::{Bus, Publisher, ShutdownListener};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};
use types::messages::{CandidateArray, TargetValue};

use crate::config::EmitterConfig;
use crate::error::EmitterError;
use crate::source::{Sample, SampleSource};

pub struct Emitter {
    config: EmitterConfig,
    source: Box<dyn SampleSource>,
    target_pub: Publisher<TargetValue>,
    candidates_pub: Publisher<CandidateArray>,
    emitted: u64,
}

impl Emitter {
    /// Build an emitter using the source named in `config`.
    pub fn new(bus: &Bus, config: EmitterConfig) -> Result<Self, EmitterError> {
        let source = config.source.build()?;
        Self::with_source(bus, config, source)
    }

    /// Build an emitter with an explicit source, ignoring `config.source`.
    pub fn with_source(
        bus: &Bus,
        config: EmitterConfig,
        source: Box<dyn SampleSource>,
    ) -> Result<Self, EmitterError> {
        if config.period_ms == 0 {
            return Err(EmitterError::ZeroPeriod);
        }

        let qos = config.qos();
        let target_pub = bus.create_publisher::<TargetValue>(&config.node_name, &config.target_topic, qos)?;
        let candidates_pub =
            bus.create_publisher::<CandidateArray>(&config.node_name, &config.candidates_topic, qos)?;

        info!(
            node = %config.node_name,
            source = source.label(),
            period_ms = config.period_ms,
            "Emitter initialized"
        );

        Ok(Self {
            config,
            source,
            target_pub,
            candidates_pub,
            emitted: 0,
        })
    }

    /// Draw one sample and publish it on both topics.
    pub fn emit_once(&mut self) -> Sample {
        let sample = self.source.next_sample();

        let target_receivers = self.target_pub.publish(sample.target);
        let candidate_receivers = self.candidates_pub.publish(sample.candidates.clone());
        self.emitted += 1;

        debug!(
            node = %self.config.node_name,
            target = %sample.target,
            len = sample.candidates.len(),
            target_receivers,
            candidate_receivers,
            "Sample emitted"
        );

        sample
    }

    /// Number of samples emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Spawn the timer task. The first sample goes out one full period
    /// after start.
    pub fn start(mut self, mut shutdown: ShutdownListener) -> EmitterHandle {
        let node_name = self.config.node_name.clone();

        let task = tokio::spawn(async move {
            let period = self.config.period();
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    _ = ticker.tick() => {
                        self.emit_once();
                    }
                }
            }

            debug!(node = %self.config.node_name, emitted = self.emitted, "Emitter loop stopped");
            self.emitted
        });

        info!(node = %node_name, "Emitter started");
        EmitterHandle { node_name, task }
    }
}

/// Handle to a running emitter.
pub struct EmitterHandle {
    node_name: String,
    task: JoinHandle<u64>,
}

impl EmitterHandle {
    /// Wait for the emitter to stop; returns how many samples it emitted.
    pub async fn join(self) -> u64 {
        match self.task.await {
            Ok(emitted) => {
                info!(node = %self.node_name, emitted, "Emitter stopped");
                emitted
            }
            Err(e) => {
                error!(node = %self.node_name, error = %e, "Emitter task failed");
                0
            }
        }
    }
}
