//! Correlator configuration

use std::time::Duration;

use bus::QosProfile;
use serde::{Deserialize, Serialize};
use types::topics::{CANDIDATES_TOPIC, DEFAULT_QUEUE_DEPTH, RESULT_TOPIC, TARGET_TOPIC};

/// Configuration for the correlator.
///
/// Every field has a default; a partial config file overrides only what it
/// names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelatorConfig {
    /// Node name stamped on published results.
    pub node_name: String,
    /// Period of the computation timer in milliseconds.
    pub tick_period_ms: u64,
    /// Topic carrying the target value.
    pub target_topic: String,
    /// Topic carrying the candidate array.
    pub candidates_topic: String,
    /// Topic the result pair is published on.
    pub result_topic: String,
    /// KeepLast depth for all three topics.
    pub queue_depth: usize,
    /// Publish an empty pair when no match exists (otherwise stay silent).
    pub publish_empty_result: bool,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            node_name: "SubscriberAndPublisher".to_string(),
            tick_period_ms: 1000,
            target_topic: TARGET_TOPIC.to_string(),
            candidates_topic: CANDIDATES_TOPIC.to_string(),
            result_topic: RESULT_TOPIC.to_string(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            publish_empty_result: true,
        }
    }
}

impl CorrelatorConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn qos(&self) -> QosProfile {
        QosProfile::keep_last(self.queue_depth)
    }
}
