//! Emitter Service
//!
//! Publishes a target value and a candidate array on two independent topics
//! at a fixed period. The two publications are not coordinated in any way;
//! downstream consumers must not assume they arrive together.
//!
//! # Modules
//! - `config`: Period, topics and sample source selection
//! - `source`: Constant and seeded-random sample sources
//! - `emitter`: Timer task and publishers

pub mod config;
pub mod emitter;
pub mod error;
pub mod source;

pub use config::{EmitterConfig, SourceConfig};
pub use emitter::{Emitter, EmitterHandle};
pub use error::EmitterError;
pub use source::{ConstantSource, Sample, SampleSource, SeededRandomSource, MAX_CANDIDATES};
