//! Property tests for the two-sum solver
//!
//! Each property is checked against a brute-force search over all pairs.

use correlator::solver::{find_pair, solve};
use proptest::prelude::*;
use types::messages::{CandidateArray, ResultPair, TargetValue};

/// All pairs `(current, previous)` with `previous < current` that sum to
/// `target` under i8 wraparound, ordered by `current` then `previous`.
fn brute_force(target: i8, candidates: &[i8]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for current in 0..candidates.len() {
        for previous in 0..current {
            if candidates[current].wrapping_add(candidates[previous]) == target {
                pairs.push((current, previous));
            }
        }
    }
    pairs
}

/// Narrow value range so that matches are common.
fn dense_input() -> impl Strategy<Value = (i8, Vec<i8>)> {
    (-16i8..16, prop::collection::vec(-8i8..8, 0..24))
}

/// Full i8 range to exercise wraparound.
fn wide_input() -> impl Strategy<Value = (i8, Vec<i8>)> {
    (any::<i8>(), prop::collection::vec(any::<i8>(), 0..64))
}

fn check_existence(target: i8, candidates: &[i8]) -> Result<(), TestCaseError> {
    let expected = brute_force(target, candidates);
    match find_pair(target, candidates) {
        Some((current, previous)) => {
            prop_assert!(previous < current);
            prop_assert!(current < candidates.len());
            prop_assert_eq!(candidates[current].wrapping_add(candidates[previous]), target);
        }
        None => prop_assert!(expected.is_empty(), "missed pairs {:?}", expected),
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_finds_a_pair_iff_one_exists((target, candidates) in dense_input()) {
        check_existence(target, &candidates)?;
    }

    #[test]
    fn prop_wraparound_pairs_found((target, candidates) in wide_input()) {
        check_existence(target, &candidates)?;
    }

    #[test]
    fn prop_first_completing_index_wins((target, candidates) in dense_input()) {
        let expected = brute_force(target, &candidates);
        if let Some((current, _)) = find_pair(target, &candidates) {
            let smallest = expected.iter().map(|(c, _)| *c).min();
            prop_assert_eq!(Some(current), smallest);
        }
    }

    #[test]
    fn prop_previous_is_first_occurrence((target, candidates) in dense_input()) {
        if let Some((current, previous)) = find_pair(target, &candidates) {
            let complement = target.wrapping_sub(candidates[current]);
            let first = candidates.iter().position(|&v| v == complement);
            prop_assert_eq!(Some(previous), first);
        }
    }

    #[test]
    fn prop_solve_is_idempotent((target, candidates) in wide_input()) {
        let target = TargetValue::new(target);
        let candidates = CandidateArray::new(candidates);
        let first = solve(target, &candidates);
        prop_assert_eq!(solve(target, &candidates), first.clone());
        prop_assert!(first.is_empty() || first.indices().len() == 2);
    }
}

#[test]
fn test_reference_scenarios() {
    let cases: [(i8, Vec<i8>, ResultPair); 4] = [
        (6, vec![2, 3, 4], ResultPair::matched(2, 0)),
        (10, vec![1, 2, 3], ResultPair::empty()),
        (10, vec![5, 5], ResultPair::matched(1, 0)),
        (-128, vec![1, 127], ResultPair::matched(1, 0)),
    ];

    for (target, candidates, expected) in cases {
        assert_eq!(
            solve(TargetValue::new(target), &CandidateArray::new(candidates.clone())),
            expected,
            "target={} candidates={:?}",
            target,
            candidates
        );
    }
}
