//! Attempt batching for parallel balance searches.
//!
//! The attempt budget is split into one batch per worker. Every batch is an independent
//! search with its own generator and its own reshuffle schedule; the batch outcomes are then
//! reduced to the lowest score.

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use rayon::prelude::*;

use crate::balance::attributes::{Player, WeightTable};
use crate::balance::optimizer::{SearchLimits, SearchOutcome, StochasticOptimizer};
use crate::balance::slots::SlotLayout;

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; earlier batches take the remainder.
///
/// # Example
/// ```
/// # use fairplay::parallel::batch_ranges;
/// let ranges = batch_ranges(8400, 4);
/// assert_eq!(ranges, vec![(0, 2100), (2100, 4200), (4200, 6300), (6300, 8400)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + usize::from(i < remainder);
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Generator seed for one worker. Worker 0 keeps the scenario seed, so a single-batch run
/// matches the sequential search.
pub fn worker_seed(seed: u64, worker: usize) -> u64 {
    seed ^ (worker as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Runs `limits.max_attempts` attempts split over `workers` independent searches in parallel
/// and keeps the best. Ties go to the lowest worker index. Any worker crossing the early-exit
/// threshold stops the others at their next attempt.
pub fn search_in_batches(
    roster: &[Player],
    layout: &SlotLayout,
    weights: &WeightTable,
    limits: SearchLimits,
    seed: u64,
    workers: usize,
) -> SearchOutcome {
    let started = Instant::now();
    let ranges = batch_ranges(limits.max_attempts.max(1), workers.max(1));
    let stop = AtomicBool::new(false);

    let outcomes: Vec<SearchOutcome> = ranges
        .par_iter()
        .enumerate()
        .map(|(worker, (start, end))| {
            let batch_limits = SearchLimits {
                max_attempts: end - start,
                ..limits
            };
            StochasticOptimizer::seeded(worker_seed(seed, worker), batch_limits)
                .optimize_with_progress(roster, layout, weights, Some(&stop), |_, _| {})
        })
        .collect();

    let attempts = outcomes.iter().map(|o| o.attempts).sum();
    let improvements = outcomes.iter().map(|o| o.improvements).sum();
    let early_exit = outcomes.iter().any(|o| o.early_exit);
    let timed_out = outcomes.iter().any(|o| o.timed_out);

    let best = outcomes
        .into_iter()
        .reduce(|best, next| if next.score < best.score { next } else { best });

    match best {
        Some(best) => SearchOutcome {
            attempts,
            improvements,
            early_exit,
            timed_out,
            elapsed: started.elapsed(),
            ..best
        },
        None => SearchOutcome {
            assignments: Vec::new(),
            score: f64::INFINITY,
            attempts: 0,
            improvements: 0,
            early_exit: false,
            timed_out: false,
            elapsed: started.elapsed(),
        },
    }
}
