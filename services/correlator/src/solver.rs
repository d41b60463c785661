//! Single-pass two-sum
//!
//! Scans candidates left to right, remembering the first index at which
//! each value was seen. The first index whose complement has already been
//! seen ends the scan. Complements use 8-bit wraparound: `-128 - 1` is
//! `127`, not `-129`.

use types::messages::{CandidateArray, ResultPair, TargetValue};

/// First-seen index per `i8` value. Indexed by `value as u8`, so lookups
/// never hash and the table never grows past 256 slots.
struct FirstSeen {
    slots: [Option<usize>; 256],
}

impl FirstSeen {
    fn new() -> Self {
        Self { slots: [None; 256] }
    }

    fn get(&self, value: i8) -> Option<usize> {
        self.slots[value as u8 as usize]
    }

    /// Record `index` for `value` unless an earlier index is already there.
    fn insert_first(&mut self, value: i8, index: usize) {
        let slot = &mut self.slots[value as u8 as usize];
        if slot.is_none() {
            *slot = Some(index);
        }
    }
}

/// Find the first pair `(current, previous)` with
/// `candidates[current] + candidates[previous] == target` under `i8`
/// wraparound, `previous < current`.
///
/// `current` is the smallest index that completes any pair; `previous` is
/// the first occurrence of its complement.
pub fn find_pair(target: i8, candidates: &[i8]) -> Option<(usize, usize)> {
    let mut seen = FirstSeen::new();

    for (index, &value) in candidates.iter().enumerate() {
        let complement = target.wrapping_sub(value);
        if let Some(previous) = seen.get(complement) {
            return Some((index, previous));
        }
        seen.insert_first(value, index);
    }

    None
}

/// Run two-sum over typed inputs. An empty result means no pair exists.
pub fn solve(target: TargetValue, candidates: &CandidateArray) -> ResultPair {
    match find_pair(target.get(), candidates.as_slice()) {
        Some((current, previous)) => ResultPair::matched(current, previous),
        None => ResultPair::empty(),
    }
}
