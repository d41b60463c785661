//! Task wiring and lifecycle
//!
//! Start order matters on an in-process bus: anything subscribed after a
//! publish never sees it. The result consumer and the correlator subscribe
//! first, the emitter starts last.

use std::collections::BTreeMap;
use std::sync::Arc;

use bus::{Bus, ShutdownListener, ShutdownSignal, Subscription};
use correlator::metrics::CorrelatorMetrics;
use correlator::{Correlator, CorrelatorHandle};
use emitter::{Emitter, EmitterHandle};
use tokio::task::JoinHandle;
use tracing::{error, info};
use types::messages::ResultPair;

use crate::config::NodeConfig;
use crate::error::LaunchError;

/// Counters gathered after every task has stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub samples_emitted: u64,
    pub results_logged: u64,
    pub correlator: BTreeMap<String, u64>,
    /// Solve-time percentiles over the recent window, if anything was solved.
    pub solve_p50_ns: Option<u64>,
    pub solve_p99_ns: Option<u64>,
}

/// Every task the process runs, plus the signal that stops them.
pub struct NodeRuntime {
    shutdown: ShutdownSignal,
    correlator: CorrelatorHandle,
    emitter: Option<EmitterHandle>,
    consumer: Option<JoinHandle<u64>>,
}

impl NodeRuntime {
    /// Start the configured tasks on `bus`. Must be called inside a tokio
    /// runtime.
    pub fn launch(bus: &Bus, config: &NodeConfig) -> Result<Self, LaunchError> {
        let shutdown = ShutdownSignal::new();

        let consumer = if config.log_results {
            let subscription = bus.create_subscription::<ResultPair>(
                &config.correlator.result_topic,
                config.correlator.qos(),
            )?;
            Some(tokio::spawn(log_results(subscription, shutdown.listener())))
        } else {
            None
        };

        let correlator = Correlator::new(bus, config.correlator.clone())?.start(shutdown.listener());

        let emitter = if config.emitter.enabled {
            Some(Emitter::new(bus, config.emitter.clone())?.start(shutdown.listener()))
        } else {
            info!("Emitter disabled; waiting for external publishers");
            None
        };

        info!(topics = ?bus.topic_names(), "Node running");

        Ok(Self {
            shutdown,
            correlator,
            emitter,
            consumer,
        })
    }

    pub fn correlator_metrics(&self) -> &Arc<CorrelatorMetrics> {
        self.correlator.metrics()
    }

    /// Signal every task to stop and wait for all of them.
    pub async fn shutdown(self) -> RunSummary {
        self.shutdown.trigger();

        let samples_emitted = match self.emitter {
            Some(emitter) => emitter.join().await,
            None => 0,
        };

        let metrics = Arc::clone(self.correlator.metrics());
        self.correlator.join().await;

        let results_logged = match self.consumer {
            Some(task) => task.await.unwrap_or_else(|e| {
                error!(error = %e, "Result consumer failed");
                0
            }),
            None => 0,
        };

        let summary = RunSummary {
            samples_emitted,
            results_logged,
            correlator: metrics.export(),
            solve_p50_ns: metrics.compute_percentile(50),
            solve_p99_ns: metrics.compute_percentile(99),
        };
        info!(
            samples_emitted,
            results_logged,
            solve_p50_ns = ?summary.solve_p50_ns,
            solve_p99_ns = ?summary.solve_p99_ns,
            "Node stopped"
        );
        summary
    }
}

async fn log_results(mut subscription: Subscription<ResultPair>, mut shutdown: ShutdownListener) -> u64 {
    let mut logged = 0u64;

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            delivery = subscription.recv() => {
                let Some(delivery) = delivery else { break };
                logged += 1;
                info!(
                    topic = subscription.topic(),
                    sequence = delivery.sequence,
                    publisher = %delivery.publisher,
                    result = %delivery.message,
                    "Result received"
                );
            }
        }
    }

    logged
}
