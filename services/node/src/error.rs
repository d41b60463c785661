//! Node-level errors

use std::path::PathBuf;

use bus::BusError;
use correlator::CorrelatorError;
use emitter::EmitterError;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors raised while starting the node's tasks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("correlator: {0}")]
    Correlator(#[from] CorrelatorError),

    #[error("emitter: {0}")]
    Emitter(#[from] EmitterError),

    #[error("result consumer: {0}")]
    Consumer(#[from] BusError),
}
