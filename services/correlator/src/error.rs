//! Correlator setup errors

use bus::BusError;
use thiserror::Error;

/// Errors raised while building a correlator. Running correlators never
/// fail: not-ready ticks and unmatched scans are ordinary outcomes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrelatorError {
    #[error("bus registration failed: {0}")]
    Bus(#[from] BusError),

    #[error("tick period must be non-zero")]
    ZeroTickPeriod,
}
