//! Bus error taxonomy

use thiserror::Error;
use types::messages::PayloadKind;

/// Errors raised when registering publishers or subscriptions.
///
/// Publishing and receiving never fail: a message with no subscribers is
/// dropped and a lagging subscription skips ahead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("invalid topic name: {0:?}")]
    InvalidTopic(String),

    #[error("invalid QoS: depth must be at least 1, got {depth}")]
    InvalidQos { depth: usize },

    #[error("topic {topic} carries {bound}, requested {requested}")]
    KindMismatch {
        topic: String,
        bound: PayloadKind,
        requested: PayloadKind,
    },
}
