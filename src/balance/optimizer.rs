//! Randomised restart search over selection orderings.
//!
//! One attempt runs the three position passes, places leftovers and scores the split. Attempts
//! are deterministic given the pool order, so the working pool is reshuffled every
//! `reshuffle_interval` attempts. The best split is kept; worse splits are never accepted.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::balance::attributes::{Player, WeightTable};
use crate::balance::leftover::{distribute_leftovers, OpenSlots};
use crate::balance::scorer::{members_by_team, score_teams};
use crate::balance::selector::{select_for_position, SelectionKeys, SELECTION_ORDER};
use crate::balance::slots::{SlotAssignment, SlotLayout, Team};

pub const DEFAULT_MAX_ATTEMPTS: usize = 8400;
pub const DEFAULT_EARLY_EXIT_THRESHOLD: f64 = 0.05;
pub const DEFAULT_RESHUFFLE_INTERVAL: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchLimits {
    pub max_attempts: usize,
    /// Search stops as soon as the best score drops below this.
    pub early_exit_threshold: f64,
    pub reshuffle_interval: usize,
    /// Optional wall-clock cap, checked between attempts.
    pub time_limit: Option<Duration>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            early_exit_threshold: DEFAULT_EARLY_EXIT_THRESHOLD,
            reshuffle_interval: DEFAULT_RESHUFFLE_INTERVAL,
            time_limit: None,
        }
    }
}

/// One scored split.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub assignments: Vec<SlotAssignment>,
    pub score: f64,
}

/// Runs the defense, attack, midfield passes over `pool`, places whoever is left and scores
/// the result. `pool` is not modified.
pub fn run_attempt<R: Rng + ?Sized>(
    pool: &[&Player],
    layout: &SlotLayout,
    weights: &WeightTable,
    rng: &mut R,
) -> Attempt {
    let mut remaining: Vec<&Player> = pool.to_vec();
    let mut assignments: Vec<SlotAssignment> = Vec::with_capacity(pool.len());

    for group in SELECTION_ORDER {
        let quota = layout.template.count(group) * 2;
        let selection = select_for_position(&remaining, quota, &SelectionKeys::for_group(group));
        assignments.extend(layout.assign_group(&selection.selected, group));
        remaining = selection.remaining;
    }

    if !remaining.is_empty() {
        let used: HashSet<u32> = assignments.iter().map(|a| a.slot_number).collect();
        let placed_a = assignments.iter().filter(|a| a.team == Team::A).count();
        let open = OpenSlots {
            team_a: layout.open_slots(Team::A, &used),
            team_b: layout.open_slots(Team::B, &used),
            placed_a,
            placed_b: assignments.len() - placed_a,
            first_overflow_slot: layout.first_overflow_slot(),
        };
        assignments.extend(distribute_leftovers(&remaining, &open, rng));
    }

    let by_id: HashMap<&str, &Player> = pool.iter().map(|p| (p.id.as_str(), *p)).collect();
    let (team_a, team_b) = members_by_team(&assignments, &by_id);
    let score = score_teams(&team_a, &team_b, weights);

    Attempt { assignments, score }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Winning split, ordered by slot number.
    pub assignments: Vec<SlotAssignment>,
    pub score: f64,
    pub attempts: usize,
    pub improvements: usize,
    pub early_exit: bool,
    pub timed_out: bool,
    pub elapsed: Duration,
}

pub struct StochasticOptimizer<R: Rng> {
    rng: R,
    limits: SearchLimits,
}

impl StochasticOptimizer<ChaCha8Rng> {
    /// Reproducible optimizer: the same seed gives the same outcome for the same input.
    pub fn seeded(seed: u64, limits: SearchLimits) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed), limits)
    }
}

impl<R: Rng> StochasticOptimizer<R> {
    pub fn new(rng: R, limits: SearchLimits) -> Self {
        Self { rng, limits }
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    pub fn optimize(
        &mut self,
        roster: &[Player],
        layout: &SlotLayout,
        weights: &WeightTable,
    ) -> SearchOutcome {
        self.optimize_with_progress(roster, layout, weights, None, |_, _| {})
    }

    /// Like [Self::optimize], calling `on_attempt(attempts_done, best_score)` after every
    /// attempt. When `stop` is given, the search also ends once another worker raises it and
    /// raises it itself on early exit.
    pub fn optimize_with_progress<F>(
        &mut self,
        roster: &[Player],
        layout: &SlotLayout,
        weights: &WeightTable,
        stop: Option<&AtomicBool>,
        mut on_attempt: F,
    ) -> SearchOutcome
    where
        F: FnMut(usize, f64),
    {
        let started = Instant::now();
        let max_attempts = self.limits.max_attempts.max(1);
        let reshuffle_interval = self.limits.reshuffle_interval.max(1);

        let mut pool: Vec<&Player> = roster.iter().collect();
        let mut best: Option<Attempt> = None;
        let mut best_score = f64::INFINITY;
        let mut attempts = 0usize;
        let mut improvements = 0usize;
        let mut early_exit = false;
        let mut timed_out = false;

        for attempt in 0..max_attempts {
            if attempts > 0 {
                if let Some(limit) = self.limits.time_limit {
                    if started.elapsed() >= limit {
                        timed_out = true;
                        break;
                    }
                }
                if stop.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                    break;
                }
            }

            if attempt % reshuffle_interval == 0 {
                pool.shuffle(&mut self.rng);
            }

            let candidate = run_attempt(&pool, layout, weights, &mut self.rng);
            attempts += 1;

            if candidate.score < best_score {
                debug!(attempt, score = candidate.score, "improved split");
                best_score = candidate.score;
                best = Some(candidate);
                improvements += 1;
            }
            on_attempt(attempts, best_score);

            if best_score < self.limits.early_exit_threshold {
                early_exit = true;
                if let Some(flag) = stop {
                    flag.store(true, Ordering::Relaxed);
                }
                break;
            }
        }

        let mut assignments = best.map(|attempt| attempt.assignments).unwrap_or_default();
        // The first pick of every pass goes to A; the score is side-symmetric, so present the
        // split with a random orientation.
        if self.rng.gen_bool(0.5) {
            assignments = assignments.iter().map(|a| layout.mirror(a)).collect();
        }
        assignments.sort_by_key(|a| a.slot_number);

        let elapsed = started.elapsed();
        info!(
            attempts,
            improvements,
            score = best_score,
            early_exit,
            timed_out,
            elapsed_ms = elapsed.as_millis() as u64,
            "balance search finished"
        );

        SearchOutcome {
            assignments,
            score: best_score,
            attempts,
            improvements,
            early_exit,
            timed_out,
            elapsed,
        }
    }
}
