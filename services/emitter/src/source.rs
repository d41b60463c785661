//! Sample sources
//!
//! A source decides what the emitter publishes on each tick. The constant
//! source repeats one sample forever; the seeded source draws fresh arrays
//! from a ChaCha8 stream, so two sources with the same seed agree exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use types::messages::{CandidateArray, TargetValue};

/// One tick's worth of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub target: TargetValue,
    pub candidates: CandidateArray,
}

/// Anything that can produce samples for the emitter.
pub trait SampleSource: Send + 'static {
    fn next_sample(&mut self) -> Sample;

    /// Short name for logs.
    fn label(&self) -> &'static str;
}

/// Repeats the same target and candidates on every tick.
#[derive(Debug, Clone)]
pub struct ConstantSource {
    sample: Sample,
}

impl ConstantSource {
    pub fn new(target: i8, candidates: Vec<i8>) -> Self {
        Self {
            sample: Sample {
                target: TargetValue::new(target),
                candidates: CandidateArray::new(candidates),
            },
        }
    }
}

impl Default for ConstantSource {
    fn default() -> Self {
        Self::new(6, vec![2, 3, 4])
    }
}

impl SampleSource for ConstantSource {
    fn next_sample(&mut self) -> Sample {
        self.sample.clone()
    }

    fn label(&self) -> &'static str {
        "constant"
    }
}

/// Longest candidate array the seeded source will generate.
pub const MAX_CANDIDATES: usize = 4096;

/// Draws a random target and candidate array on every tick.
///
/// Lengths and values are uniform over the inclusive ranges given.
pub struct SeededRandomSource {
    rng: ChaCha8Rng,
    min_len: usize,
    max_len: usize,
    min_value: i8,
    max_value: i8,
}

impl SeededRandomSource {
    /// Create a source; returns `None` if either range is inverted or
    /// `max_len` exceeds [`MAX_CANDIDATES`].
    pub fn new(seed: u64, min_len: usize, max_len: usize, min_value: i8, max_value: i8) -> Option<Self> {
        if min_len > max_len || max_len > MAX_CANDIDATES || min_value > max_value {
            return None;
        }
        Some(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            min_len,
            max_len,
            min_value,
            max_value,
        })
    }
}

impl SampleSource for SeededRandomSource {
    fn next_sample(&mut self) -> Sample {
        let target = self.rng.gen::<i8>();
        let len = self.rng.gen_range(self.min_len..=self.max_len);
        let values = (0..len)
            .map(|_| self.rng.gen_range(self.min_value..=self.max_value))
            .collect();

        Sample {
            target: TargetValue::new(target),
            candidates: CandidateArray::new(values),
        }
    }

    fn label(&self) -> &'static str {
        "seeded_random"
    }
}
