//! Counters for the correlator
//!
//! Input arrivals, tick outcomes and publications are plain atomic counters;
//! solver time per tick goes into a bounded window. `export` gives a
//! sorted snapshot suitable for logging or a scrape endpoint.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::state::TickOutcome;

/// Core metrics for the correlator.
pub struct CorrelatorMetrics {
    // Inputs
    pub targets_received: AtomicU64,
    pub candidates_received: AtomicU64,
    pub inputs_stale: AtomicU64,
    pub input_gaps: AtomicU64,
    pub inputs_missed: AtomicU64,

    // Ticks
    pub ticks_total: AtomicU64,
    pub ticks_not_ready: AtomicU64,
    pub ticks_no_candidates: AtomicU64,
    pub matches_found: AtomicU64,
    pub no_match: AtomicU64,
    pub tick_compute_ns: Mutex<SolveTimeWindow>,

    // Output
    pub results_published: AtomicU64,
    pub results_suppressed: AtomicU64,
}

impl CorrelatorMetrics {
    pub fn new() -> Self {
        Self {
            targets_received: AtomicU64::new(0),
            candidates_received: AtomicU64::new(0),
            inputs_stale: AtomicU64::new(0),
            input_gaps: AtomicU64::new(0),
            inputs_missed: AtomicU64::new(0),
            ticks_total: AtomicU64::new(0),
            ticks_not_ready: AtomicU64::new(0),
            ticks_no_candidates: AtomicU64::new(0),
            matches_found: AtomicU64::new(0),
            no_match: AtomicU64::new(0),
            tick_compute_ns: Mutex::new(SolveTimeWindow::with_capacity(1000)),
            results_published: AtomicU64::new(0),
            results_suppressed: AtomicU64::new(0),
        }
    }

    pub fn record_target(&self) {
        self.targets_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_candidates(&self) {
        self.candidates_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale(&self) {
        self.inputs_stale.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a sequence gap of `missed` messages.
    pub fn record_gap(&self, missed: u64) {
        self.input_gaps.fetch_add(1, Ordering::Relaxed);
        self.inputs_missed.fetch_add(missed, Ordering::Relaxed);
    }

    /// Record a tick and how long the gated solve took.
    pub fn record_tick(&self, outcome: &TickOutcome, compute_ns: u64) {
        self.ticks_total.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            TickOutcome::NotReady => &self.ticks_not_ready,
            TickOutcome::NoCandidates => &self.ticks_no_candidates,
            TickOutcome::Solved(pair) if pair.is_empty() => &self.no_match,
            TickOutcome::Solved(_) => &self.matches_found,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if matches!(outcome, TickOutcome::Solved(_)) {
            self.tick_compute_ns
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(compute_ns);
        }
    }

    pub fn record_published(&self) {
        self.results_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suppressed(&self) {
        self.results_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    /// Solver time percentile (0-100) over the recent window.
    pub fn compute_percentile(&self, p: usize) -> Option<u64> {
        self.tick_compute_ns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .percentile(p)
    }

    /// Export counters as a sorted map.
    pub fn export(&self) -> BTreeMap<String, u64> {
        let counters = [
            ("targets_received", &self.targets_received),
            ("candidates_received", &self.candidates_received),
            ("inputs_stale", &self.inputs_stale),
            ("input_gaps", &self.input_gaps),
            ("inputs_missed", &self.inputs_missed),
            ("ticks_total", &self.ticks_total),
            ("ticks_not_ready", &self.ticks_not_ready),
            ("ticks_no_candidates", &self.ticks_no_candidates),
            ("matches_found", &self.matches_found),
            ("no_match", &self.no_match),
            ("results_published", &self.results_published),
            ("results_suppressed", &self.results_suppressed),
        ];

        counters
            .into_iter()
            .map(|(name, counter)| (name.to_string(), counter.load(Ordering::Relaxed)))
            .collect()
    }
}

impl Default for CorrelatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded window of recent solve times, oldest evicted first.
pub struct SolveTimeWindow {
    samples: VecDeque<u64>,
    capacity: usize,
}

impl SolveTimeWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, ns: u64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(ns);
    }

    /// Nearest-rank percentile (0-100); `None` while the window is empty.
    pub fn percentile(&self, p: usize) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }

        let mut values: Vec<u64> = self.samples.iter().copied().collect();
        let rank = ((p.min(100) * values.len() + 99) / 100).max(1);
        let (_, nth, _) = values.select_nth_unstable(rank - 1);
        Some(*nth)
    }
}
