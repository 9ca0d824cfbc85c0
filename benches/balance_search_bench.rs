//! Compare sequential vs parallel balance searches on a full 9v9 roster.
//!
//! Run with: `cargo bench --bench balance_search`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fairplay::balance::attributes::{Attribute, Player, PlayerRatings, WeightTable};
use fairplay::balance::optimizer::{run_attempt, SearchLimits, StochasticOptimizer};
use fairplay::balance::slots::SlotLayout;
use fairplay::balance::template::PositionTemplate;
use fairplay::parallel::search_in_batches;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Spread ratings so the search never hits the early-exit threshold on attempt one.
fn roster(count: usize) -> Vec<Player> {
    (0..count)
        .map(|i| {
            let rating = |k: usize| 1.0 + ((i * 7 + k * 5) % 9) as f64 * 0.5;
            Player::new(
                format!("p{i}"),
                format!("Player {i}"),
                PlayerRatings::default()
                    .with(Attribute::Defending, rating(1))
                    .with(Attribute::Goalscoring, rating(2))
                    .with(Attribute::StaminaPace, rating(3))
                    .with(Attribute::Control, rating(4))
                    .with(Attribute::Teamwork, rating(5))
                    .with(Attribute::Resilience, rating(6)),
            )
        })
        .collect()
}

fn bench_single_attempt(c: &mut Criterion) {
    let players = roster(18);
    let pool: Vec<&Player> = players.iter().collect();
    let layout = SlotLayout::new(9, PositionTemplate::new(3, 4, 2));
    let weights = WeightTable::default();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    c.bench_function("run_attempt_9v9", |b| {
        b.iter(|| black_box(run_attempt(&pool, &layout, &weights, &mut rng)));
    });
}

fn bench_search_sequential_vs_parallel(c: &mut Criterion) {
    let players = roster(18);
    let layout = SlotLayout::new(9, PositionTemplate::new(3, 4, 2));
    let weights = WeightTable::default();
    let limits = SearchLimits {
        early_exit_threshold: 0.0,
        ..SearchLimits::default()
    };
    let seed = 42u64;
    let workers = rayon::current_num_threads();

    let mut group = c.benchmark_group("balance_search");
    group.sample_size(20);
    group.measurement_time(std::time::Duration::from_secs(10));

    group.bench_function("sequential", |b| {
        b.iter(|| {
            black_box(StochasticOptimizer::seeded(seed, limits).optimize(&players, &layout, &weights))
        });
    });

    group.bench_function("parallel", |b| {
        b.iter(|| {
            black_box(search_in_batches(
                &players, &layout, &weights, limits, seed, workers,
            ))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single_attempt, bench_search_sequential_vs_parallel);
criterion_main!(benches);
