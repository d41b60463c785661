//! Quality-of-service profile and lag accounting
//!
//! Topics keep the last `depth` messages. A subscription that falls more
//! than `depth` messages behind loses the oldest ones; the loss is counted
//! per subscription.

use types::topics::DEFAULT_QUEUE_DEPTH;

use crate::error::BusError;

/// Delivery profile for a publisher or subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QosProfile {
    /// Number of messages retained per topic for slow subscribers.
    pub depth: usize,
}

impl QosProfile {
    /// Keep the last `depth` messages.
    pub fn keep_last(depth: usize) -> Self {
        Self { depth }
    }

    pub fn validate(&self) -> Result<(), BusError> {
        if self.depth == 0 {
            return Err(BusError::InvalidQos { depth: self.depth });
        }
        Ok(())
    }
}

impl Default for QosProfile {
    fn default() -> Self {
        Self::keep_last(DEFAULT_QUEUE_DEPTH)
    }
}

/// Per-subscription record of messages lost to lag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LagTracker {
    /// Total messages skipped because the subscription fell behind.
    messages_dropped: u64,
    /// Number of separate lag incidents.
    incidents: u64,
}

impl LagTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `skipped` messages were overwritten before delivery.
    pub fn record_lag(&mut self, skipped: u64) {
        self.messages_dropped += skipped;
        self.incidents += 1;
    }

    pub fn messages_dropped(&self) -> u64 {
        self.messages_dropped
    }

    pub fn incidents(&self) -> u64 {
        self.incidents
    }
}
