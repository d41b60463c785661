//! Types library for the two-sum streaming node
//!
//! Message definitions shared by every component on the bus. Keeping them
//! in one crate guarantees publishers and subscribers agree on payload kinds.
//!
//! # Modules
//! - `messages`: TargetValue, CandidateArray, ResultPair and the bus Envelope
//! - `topics`: Default topic names and name validation
//! - `errors`: Error taxonomy for payload decoding

// Public modules
pub mod messages;
pub mod topics;
pub mod errors;
