//! Emitter setup errors

use bus::BusError;
use thiserror::Error;

/// Errors raised while building an emitter. Publishing itself never fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitterError {
    #[error("bus registration failed: {0}")]
    Bus(#[from] BusError),

    #[error("emit period must be non-zero")]
    ZeroPeriod,

    #[error("invalid sample source: {0}")]
    InvalidSource(String),
}
