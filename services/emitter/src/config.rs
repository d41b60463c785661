//! Emitter configuration

use std::time::Duration;

use bus::QosProfile;
use serde::{Deserialize, Serialize};
use types::topics::{CANDIDATES_TOPIC, DEFAULT_QUEUE_DEPTH, TARGET_TOPIC};

use crate::error::EmitterError;
use crate::source::{ConstantSource, SampleSource, SeededRandomSource, MAX_CANDIDATES};

/// Which sample source the emitter draws from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Same target and candidates every tick.
    Constant { target: i8, candidates: Vec<i8> },
    /// Fresh seeded-random sample every tick.
    Random {
        seed: u64,
        min_len: usize,
        max_len: usize,
        min_value: i8,
        max_value: i8,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Constant {
            target: 6,
            candidates: vec![2, 3, 4],
        }
    }
}

impl SourceConfig {
    pub fn build(&self) -> Result<Box<dyn SampleSource>, EmitterError> {
        match self {
            SourceConfig::Constant { target, candidates } => {
                Ok(Box::new(ConstantSource::new(*target, candidates.clone())))
            }
            SourceConfig::Random {
                seed,
                min_len,
                max_len,
                min_value,
                max_value,
            } => SeededRandomSource::new(*seed, *min_len, *max_len, *min_value, *max_value)
                .map(|source| Box::new(source) as Box<dyn SampleSource>)
                .ok_or_else(|| {
                    EmitterError::InvalidSource(format!(
                        "length range {}..={} (at most {}) or value range {}..={} is invalid",
                        min_len, max_len, MAX_CANDIDATES, min_value, max_value
                    ))
                }),
        }
    }
}

/// Configuration for the emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Whether the node binary starts an emitter at all.
    pub enabled: bool,
    /// Node name stamped on published messages.
    pub node_name: String,
    /// Publish period in milliseconds.
    pub period_ms: u64,
    /// Topic for the target value.
    pub target_topic: String,
    /// Topic for the candidate array.
    pub candidates_topic: String,
    /// KeepLast depth for both topics.
    pub queue_depth: usize,
    /// Sample source.
    pub source: SourceConfig,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            node_name: "minimal_publisher".to_string(),
            period_ms: 1000,
            target_topic: TARGET_TOPIC.to_string(),
            candidates_topic: CANDIDATES_TOPIC.to_string(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            source: SourceConfig::default(),
        }
    }
}

impl EmitterConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn qos(&self) -> QosProfile {
        QosProfile::keep_last(self.queue_depth)
    }
}
