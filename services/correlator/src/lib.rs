//! Two-Sum Correlator Service
//!
//! Subscribes to the target and candidate topics independently, keeps the
//! latest value of each in one guarded state cell, and on a fixed-rate
//! timer publishes the first index pair whose values sum to the target.
//!
//! # Architecture
//!
//! ```text
//!   /target            /input
//!      │                 │
//! ┌────▼────┐       ┌────▼────┐
//! │ Tracker │       │ Tracker │   ← sequence gaps / stale drops
//! └────┬────┘       └────┬────┘
//!      │                 │
//! ┌────▼─────────────────▼────┐
//! │  StateCell (Mutex)        │   ← NotReady → Ready
//! └────────────┬──────────────┘
//!              │  timer tick
//!         ┌────▼────┐
//!         │ Solver  │             ← single-pass two-sum, i8 wraparound
//!         └────┬────┘
//!              ▼
//!          /solution
//! ```

pub mod config;
pub mod error;
pub mod ingestion;
pub mod metrics;
pub mod node;
pub mod solver;
pub mod state;

pub use config::CorrelatorConfig;
pub use error::CorrelatorError;
pub use node::{Correlator, CorrelatorHandle};
pub use state::{Readiness, StateCell, TickOutcome};
