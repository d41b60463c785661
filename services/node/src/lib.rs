//! Two-Sum Node
//!
//! Wires the emitter, the correlator and a result-logging consumer onto one
//! in-process bus and manages their shared shutdown.
//!
//! # Modules
//! - `config`: Whole-process configuration and loading
//! - `runtime`: Launch and orderly shutdown of every task

pub mod config;
pub mod error;
pub mod runtime;

pub use config::{NodeConfig, CONFIG_ENV_VAR};
pub use error::{ConfigError, LaunchError};
pub use runtime::{NodeRuntime, RunSummary};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
