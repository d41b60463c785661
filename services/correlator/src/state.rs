//! Correlation state machine
//!
//! `NotReady` until the first target value arrives, `Ready` forever after.
//! Candidate availability is not a state: it is re-checked on every tick.
//!
//! Both input handlers and the tick go through one [`StateCell`], so a tick
//! never sees a half-replaced candidate array or target.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use types::messages::{CandidateArray, ResultPair, TargetValue};

use crate::solver;

/// Whether a target value has ever been received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    #[default]
    NotReady,
    Ready,
}

/// What a single tick decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No target received yet; nothing is published.
    NotReady,
    /// Target known but the candidate array is empty; nothing is published.
    NoCandidates,
    /// Two-sum ran; the pair may be empty when no match exists.
    Solved(ResultPair),
}

impl TickOutcome {
    /// Label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            TickOutcome::NotReady => "not_ready",
            TickOutcome::NoCandidates => "no_candidates",
            TickOutcome::Solved(pair) if pair.is_empty() => "no_match",
            TickOutcome::Solved(_) => "matched",
        }
    }
}

/// Latest inputs seen by the correlator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelatorState {
    target: TargetValue,
    readiness: Readiness,
    candidates: CandidateArray,
}

impl CorrelatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the target and mark the state ready.
    pub fn on_target_value(&mut self, value: TargetValue) {
        self.target = value;
        self.readiness = Readiness::Ready;
    }

    /// Replace the candidate array wholesale.
    pub fn on_candidate_array(&mut self, candidates: CandidateArray) {
        self.candidates = candidates;
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Latest target, if one has been received.
    pub fn target(&self) -> Option<TargetValue> {
        match self.readiness {
            Readiness::Ready => Some(self.target),
            Readiness::NotReady => None,
        }
    }

    pub fn candidates(&self) -> &CandidateArray {
        &self.candidates
    }

    /// Gate on readiness and candidates, then run two-sum.
    pub fn evaluate(&self) -> TickOutcome {
        if self.readiness == Readiness::NotReady {
            return TickOutcome::NotReady;
        }
        if self.candidates.is_empty() {
            return TickOutcome::NoCandidates;
        }
        TickOutcome::Solved(solver::solve(self.target, &self.candidates))
    }
}

/// Shared, mutex-guarded correlator state. Clones share the same cell.
///
/// Critical sections are plain field updates or one solver pass; nothing
/// awaits or does I/O while holding the lock.
#[derive(Debug, Clone, Default)]
pub struct StateCell {
    inner: Arc<Mutex<CorrelatorState>>,
}

impl StateCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_target_value(&self, value: TargetValue) {
        self.lock().on_target_value(value);
    }

    pub fn on_candidate_array(&self, candidates: CandidateArray) {
        self.lock().on_candidate_array(candidates);
    }

    pub fn evaluate(&self) -> TickOutcome {
        self.lock().evaluate()
    }

    pub fn readiness(&self) -> Readiness {
        self.lock().readiness()
    }

    // Every mutation is a single assignment, so a poisoned guard still holds
    // a consistent state.
    fn lock(&self) -> MutexGuard<'_, CorrelatorState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_not_ready() {
        let state = CorrelatorState::new();
        assert_eq!(state.readiness(), Readiness::NotReady);
        assert_eq!(state.target(), None);
        assert_eq!(state.evaluate(), TickOutcome::NotReady);
    }

    #[test]
    fn test_candidates_alone_do_not_make_ready() {
        let mut state = CorrelatorState::new();
        state.on_candidate_array(CandidateArray::new(vec![2, 3, 4]));
        assert_eq!(state.evaluate(), TickOutcome::NotReady);
    }

    #[test]
    fn test_target_without_candidates() {
        let mut state = CorrelatorState::new();
        state.on_target_value(TargetValue::new(6));
        assert_eq!(state.readiness(), Readiness::Ready);
        assert_eq!(state.evaluate(), TickOutcome::NoCandidates);
    }

    #[test]
    fn test_ready_state_solves() {
        let mut state = CorrelatorState::new();
        state.on_candidate_array(CandidateArray::new(vec![2, 3, 4]));
        state.on_target_value(TargetValue::new(6));
        assert_eq!(state.evaluate(), TickOutcome::Solved(ResultPair::matched(2, 0)));
    }

    #[test]
    fn test_no_match_is_solved_empty() {
        let mut state = CorrelatorState::new();
        state.on_target_value(TargetValue::new(10));
        state.on_candidate_array(CandidateArray::new(vec![1, 2, 3]));
        let outcome = state.evaluate();
        assert_eq!(outcome, TickOutcome::Solved(ResultPair::empty()));
        assert_eq!(outcome.label(), "no_match");
    }

    #[test]
    fn test_candidates_replaced_not_appended() {
        let mut state = CorrelatorState::new();
        state.on_target_value(TargetValue::new(10));
        state.on_candidate_array(CandidateArray::new(vec![5]));
        state.on_candidate_array(CandidateArray::new(vec![5]));
        assert_eq!(state.candidates().as_slice(), &[5]);
        assert_eq!(state.evaluate(), TickOutcome::Solved(ResultPair::empty()));
    }

    #[test]
    fn test_empty_candidates_make_state_non_computable_again() {
        let mut state = CorrelatorState::new();
        state.on_target_value(TargetValue::new(6));
        state.on_candidate_array(CandidateArray::new(vec![2, 3, 4]));
        state.on_candidate_array(CandidateArray::default());
        assert_eq!(state.evaluate(), TickOutcome::NoCandidates);
        // Readiness never reverts
        assert_eq!(state.readiness(), Readiness::Ready);
    }

    #[test]
    fn test_target_overwritten() {
        let mut state = CorrelatorState::new();
        state.on_candidate_array(CandidateArray::new(vec![5, 5, 1]));
        state.on_target_value(TargetValue::new(10));
        state.on_target_value(TargetValue::new(6));
        assert_eq!(state.target(), Some(TargetValue::new(6)));
        assert_eq!(state.evaluate(), TickOutcome::Solved(ResultPair::matched(2, 0)));
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let cell = StateCell::new();
        cell.on_target_value(TargetValue::new(6));
        cell.on_candidate_array(CandidateArray::new(vec![2, 3, 4]));

        let first = cell.evaluate();
        for _ in 0..5 {
            assert_eq!(cell.evaluate(), first);
        }
    }

    #[test]
    fn test_cell_clones_share_state() {
        let cell = StateCell::new();
        let writer = cell.clone();
        writer.on_target_value(TargetValue::new(1));
        assert_eq!(cell.readiness(), Readiness::Ready);
        assert_eq!(cell.evaluate(), TickOutcome::NoCandidates);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(TickOutcome::NotReady.label(), "not_ready");
        assert_eq!(TickOutcome::NoCandidates.label(), "no_candidates");
        assert_eq!(TickOutcome::Solved(ResultPair::matched(1, 0)).label(), "matched");
    }
}
