//! Error types for message handling
//!
//! Domain outcomes (no match, not ready) are never errors; only a payload
//! arriving with the wrong kind is.

use thiserror::Error;

use crate::messages::PayloadKind;

/// Errors raised while converting between payloads and typed messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("payload kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: PayloadKind,
        actual: PayloadKind,
    },
}
