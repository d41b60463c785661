//! Per-topic input tracking
//!
//! Checks the bus sequence of every delivery before it reaches the state
//! cell:
//! - Strictly increasing sequences are applied
//! - A jump past `last + 1` is a gap: counted, logged, still applied
//! - A sequence at or below `last` is stale and never applied, so an old
//!   value can not overwrite a newer one

use tracing::{debug, warn};

/// Errors raised when a delivery must not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestionError {
    #[error("stale sequence on {topic}: last={last}, received={received}")]
    Stale {
        topic: String,
        last: u64,
        received: u64,
    },
}

/// Result of tracking a single delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionResult {
    /// Next expected sequence (or the first one seen).
    Accepted,
    /// Accepted, but `missed` messages were never delivered before it.
    GapDetected { missed: u64 },
}

/// Sequence tracker for one subscribed topic.
#[derive(Debug, Clone)]
pub struct InputTracker {
    topic: String,
    /// Last applied sequence number.
    last_sequence: Option<u64>,
    /// Deliveries applied.
    accepted: u64,
    /// Deliveries rejected as stale.
    rejected: u64,
    /// Gap incidents.
    gaps_detected: u64,
    /// Messages known to be missing across all gaps.
    messages_missed: u64,
}

impl InputTracker {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            last_sequence: None,
            accepted: 0,
            rejected: 0,
            gaps_detected: 0,
            messages_missed: 0,
        }
    }

    /// Track one delivery.
    ///
    /// `lagged` is the number of messages the bus reported as overwritten
    /// before this delivery; it only matters for the first delivery, when
    /// there is no previous sequence to measure the gap against.
    pub fn ingest(&mut self, sequence: u64, lagged: u64) -> Result<IngestionResult, IngestionError> {
        let missed = match self.last_sequence {
            Some(last) if sequence <= last => {
                self.rejected += 1;
                debug!(
                    topic = %self.topic,
                    last_sequence = last,
                    received_sequence = sequence,
                    "Dropping stale input"
                );
                return Err(IngestionError::Stale {
                    topic: self.topic.clone(),
                    last,
                    received: sequence,
                });
            }
            Some(last) => sequence - last - 1,
            None => lagged,
        };

        self.last_sequence = Some(sequence);
        self.accepted += 1;

        if missed == 0 {
            return Ok(IngestionResult::Accepted);
        }

        self.gaps_detected += 1;
        self.messages_missed += missed;
        warn!(
            topic = %self.topic,
            sequence,
            missed,
            total_missed = self.messages_missed,
            "Input gap detected; applying latest value"
        );
        Ok(IngestionResult::GapDetected { missed })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn gaps_detected(&self) -> u64 {
        self.gaps_detected
    }

    pub fn messages_missed(&self) -> u64 {
        self.messages_missed
    }
}
