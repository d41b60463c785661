//! Correlator runtime
//!
//! Three independent tasks share one [`StateCell`]:
//! - target input: `/target` deliveries → `on_target_value`
//! - candidate input: `/input` deliveries → `on_candidate_array`
//! - ticker: fixed-rate timer → evaluate → publish on `/solution`
//!
//! No task assumes anything about the others' rate or interleaving.

use std::sync::Arc;

use bus::{Bus, Delivery, Publisher, ShutdownListener, Subscription};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};
use types::messages::{CandidateArray, Message, ResultPair, TargetValue};

use crate::config::CorrelatorConfig;
use crate::error::CorrelatorError;
use crate::ingestion::{IngestionResult, InputTracker};
use crate::metrics::CorrelatorMetrics;
use crate::state::{StateCell, TickOutcome};

/// State shared by the correlator's tasks.
struct Core {
    config: CorrelatorConfig,
    state: StateCell,
    metrics: Arc<CorrelatorMetrics>,
    publisher: Publisher<ResultPair>,
}

impl Core {
    fn on_target_value(&self, value: TargetValue) {
        self.state.on_target_value(value);
        self.metrics.record_target();
        debug!(node = %self.config.node_name, target = %value, "Target updated");
    }

    fn on_candidate_array(&self, candidates: CandidateArray) {
        let len = candidates.len();
        self.state.on_candidate_array(candidates);
        self.metrics.record_candidates();
        debug!(node = %self.config.node_name, len, "Candidates replaced");
    }

    /// Run the delivery through its topic tracker; false means drop it.
    fn accept<M>(&self, tracker: &mut InputTracker, delivery: &Delivery<M>) -> bool {
        match tracker.ingest(delivery.sequence, delivery.missed) {
            Ok(IngestionResult::Accepted) => true,
            Ok(IngestionResult::GapDetected { missed }) => {
                self.metrics.record_gap(missed);
                true
            }
            Err(_) => {
                self.metrics.record_stale();
                false
            }
        }
    }

    fn tick(&self) -> TickOutcome {
        let started = std::time::Instant::now();
        let outcome = self.state.evaluate();
        let compute_ns = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.metrics.record_tick(&outcome, compute_ns);

        match &outcome {
            TickOutcome::NotReady | TickOutcome::NoCandidates => {
                debug!(node = %self.config.node_name, outcome = outcome.label(), "Tick skipped");
            }
            TickOutcome::Solved(pair) if pair.is_empty() && !self.config.publish_empty_result => {
                self.metrics.record_suppressed();
                debug!(node = %self.config.node_name, "No match; publication suppressed");
            }
            TickOutcome::Solved(pair) => {
                // Lock already released; publishing happens outside the cell
                let receivers = self.publisher.publish(pair.clone());
                self.metrics.record_published();
                debug!(
                    node = %self.config.node_name,
                    outcome = outcome.label(),
                    result = %pair,
                    receivers,
                    compute_ns,
                    "Result published"
                );
            }
        }

        outcome
    }
}

/// A correlator wired to the bus but not yet running.
///
/// Subscriptions exist from construction on, so messages published between
/// `new` and `start` are not lost.
pub struct Correlator {
    core: Arc<Core>,
    target_sub: Subscription<TargetValue>,
    candidates_sub: Subscription<CandidateArray>,
}

impl Correlator {
    pub fn new(bus: &Bus, config: CorrelatorConfig) -> Result<Self, CorrelatorError> {
        if config.tick_period_ms == 0 {
            return Err(CorrelatorError::ZeroTickPeriod);
        }

        let qos = config.qos();
        let publisher = bus.create_publisher::<ResultPair>(&config.node_name, &config.result_topic, qos)?;
        let target_sub = bus.create_subscription::<TargetValue>(&config.target_topic, qos)?;
        let candidates_sub = bus.create_subscription::<CandidateArray>(&config.candidates_topic, qos)?;

        info!(
            node = %config.node_name,
            target_topic = %config.target_topic,
            candidates_topic = %config.candidates_topic,
            result_topic = %config.result_topic,
            tick_period_ms = config.tick_period_ms,
            "Correlator initialized"
        );

        Ok(Self {
            core: Arc::new(Core {
                config,
                state: StateCell::new(),
                metrics: Arc::new(CorrelatorMetrics::new()),
                publisher,
            }),
            target_sub,
            candidates_sub,
        })
    }

    /// Apply a target value directly, bypassing the bus.
    pub fn on_target_value(&self, value: TargetValue) {
        self.core.on_target_value(value);
    }

    /// Apply a candidate array directly, bypassing the bus.
    pub fn on_candidate_array(&self, candidates: CandidateArray) {
        self.core.on_candidate_array(candidates);
    }

    /// Run one computation tick now.
    pub fn tick(&self) -> TickOutcome {
        self.core.tick()
    }

    pub fn state(&self) -> &StateCell {
        &self.core.state
    }

    pub fn metrics(&self) -> &Arc<CorrelatorMetrics> {
        &self.core.metrics
    }

    pub fn config(&self) -> &CorrelatorConfig {
        &self.core.config
    }

    /// Spawn the input handlers and the ticker. The first tick fires one
    /// full period after start.
    pub fn start(self, shutdown: ShutdownListener) -> CorrelatorHandle {
        let Correlator {
            core,
            target_sub,
            candidates_sub,
        } = self;

        let tasks = vec![
            tokio::spawn(run_input(
                Arc::clone(&core),
                target_sub,
                shutdown.clone(),
                Core::on_target_value,
            )),
            tokio::spawn(run_input(
                Arc::clone(&core),
                candidates_sub,
                shutdown.clone(),
                Core::on_candidate_array,
            )),
            tokio::spawn(run_ticker(Arc::clone(&core), shutdown)),
        ];

        info!(node = %core.config.node_name, "Correlator started");

        CorrelatorHandle {
            node_name: core.config.node_name.clone(),
            tasks,
            state: core.state.clone(),
            metrics: Arc::clone(&core.metrics),
        }
    }
}

async fn run_input<M: Message>(
    core: Arc<Core>,
    mut subscription: Subscription<M>,
    mut shutdown: ShutdownListener,
    apply: fn(&Core, M),
) {
    let mut tracker = InputTracker::new(subscription.topic());

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            delivery = subscription.recv() => {
                let Some(delivery) = delivery else { break };
                if core.accept(&mut tracker, &delivery) {
                    apply(&core, delivery.message);
                }
            }
        }
    }

    debug!(
        topic = tracker.topic(),
        accepted = tracker.accepted(),
        rejected = tracker.rejected(),
        gaps = tracker.gaps_detected(),
        missed = tracker.messages_missed(),
        last_sequence = ?tracker.last_sequence(),
        lag_dropped = subscription.lag().messages_dropped(),
        "Input handler stopped"
    );
}

async fn run_ticker(core: Arc<Core>, mut shutdown: ShutdownListener) {
    let period = core.config.tick_period();
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = ticker.tick() => {
                core.tick();
            }
        }
    }

    debug!(node = %core.config.node_name, "Ticker stopped");
}

/// Handle to a running correlator.
pub struct CorrelatorHandle {
    node_name: String,
    tasks: Vec<JoinHandle<()>>,
    state: StateCell,
    metrics: Arc<CorrelatorMetrics>,
}

impl CorrelatorHandle {
    pub fn state(&self) -> &StateCell {
        &self.state
    }

    pub fn metrics(&self) -> &Arc<CorrelatorMetrics> {
        &self.metrics
    }

    /// Wait for every task to stop (after shutdown has been signalled).
    pub async fn join(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                error!(node = %self.node_name, error = %e, "Correlator task failed");
            }
        }
        info!(node = %self.node_name, "Correlator stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus::QosProfile;

    fn setup(config: CorrelatorConfig) -> (Bus, Correlator, Subscription<ResultPair>) {
        let bus = Bus::new();
        let results = bus
            .create_subscription::<ResultPair>(&config.result_topic, QosProfile::default())
            .unwrap();
        let correlator = Correlator::new(&bus, config).unwrap();
        (bus, correlator, results)
    }

    #[test]
    fn test_zero_period_rejected() {
        let bus = Bus::new();
        let config = CorrelatorConfig {
            tick_period_ms: 0,
            ..CorrelatorConfig::default()
        };
        let err = Correlator::new(&bus, config).err().unwrap();
        assert_eq!(err, CorrelatorError::ZeroTickPeriod);
    }

    #[test]
    fn test_topic_kind_conflict_surfaces() {
        let bus = Bus::new();
        bus.create_publisher::<CandidateArray>("other", "/target", QosProfile::default())
            .unwrap();
        let err = Correlator::new(&bus, CorrelatorConfig::default()).err().unwrap();
        assert!(matches!(err, CorrelatorError::Bus(_)));
    }

    #[test]
    fn test_tick_publishes_only_when_ready() {
        let (_bus, correlator, mut results) = setup(CorrelatorConfig::default());

        assert_eq!(correlator.tick(), TickOutcome::NotReady);
        correlator.on_target_value(TargetValue::new(6));
        assert_eq!(correlator.tick(), TickOutcome::NoCandidates);
        assert!(results.try_recv().is_none());

        correlator.on_candidate_array(CandidateArray::new(vec![2, 3, 4]));
        assert_eq!(correlator.tick(), TickOutcome::Solved(ResultPair::matched(2, 0)));

        let delivery = results.try_recv().unwrap();
        assert_eq!(delivery.message.indices(), &[2, 0]);
        assert_eq!(delivery.publisher, "SubscriberAndPublisher");

        let exported = correlator.metrics().export();
        assert_eq!(exported["ticks_total"], 3);
        assert_eq!(exported["results_published"], 1);
    }

    #[test]
    fn test_no_match_publishes_empty_by_default() {
        let (_bus, correlator, mut results) = setup(CorrelatorConfig::default());
        correlator.on_target_value(TargetValue::new(10));
        correlator.on_candidate_array(CandidateArray::new(vec![1, 2, 3]));

        assert_eq!(correlator.tick(), TickOutcome::Solved(ResultPair::empty()));
        assert!(results.try_recv().unwrap().message.is_empty());
    }

    #[test]
    fn test_no_match_suppressed_when_configured() {
        let config = CorrelatorConfig {
            publish_empty_result: false,
            ..CorrelatorConfig::default()
        };
        let (_bus, correlator, mut results) = setup(config);
        correlator.on_target_value(TargetValue::new(10));
        correlator.on_candidate_array(CandidateArray::new(vec![1, 2, 3]));

        assert_eq!(correlator.tick(), TickOutcome::Solved(ResultPair::empty()));
        assert!(results.try_recv().is_none());
        assert_eq!(correlator.metrics().export()["results_suppressed"], 1);

        // Matches are still published
        correlator.on_candidate_array(CandidateArray::new(vec![5, 5]));
        correlator.tick();
        assert_eq!(results.try_recv().unwrap().message, ResultPair::matched(1, 0));
    }

    #[test]
    fn test_accept_rejects_stale_delivery() {
        let (_bus, correlator, _results) = setup(CorrelatorConfig::default());
        let mut tracker = InputTracker::new("/target");
        let delivery = |sequence| Delivery {
            message: TargetValue::new(1),
            sequence,
            publisher: "p".to_string(),
            published_at: 0,
            missed: 0,
        };

        assert!(correlator.core.accept(&mut tracker, &delivery(1)));
        assert!(correlator.core.accept(&mut tracker, &delivery(4)));
        assert!(!correlator.core.accept(&mut tracker, &delivery(2)));

        let exported = correlator.metrics().export();
        assert_eq!(exported["input_gaps"], 1);
        assert_eq!(exported["inputs_missed"], 2);
        assert_eq!(exported["inputs_stale"], 1);
    }
}
