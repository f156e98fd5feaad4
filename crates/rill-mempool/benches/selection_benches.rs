//! Criterion benchmarks for rill-mempool selection strategies.
//!
//! Covers: greedy, knapsack, ancestor-set, and simulated annealing
//! selection over a fixed-size synthetic mempool with a CPFP package mixed
//! into a field of independent fillers.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rill_mempool::selection::{ancestor, annealing, greedy, knapsack};
use rill_mempool::Mempool;

const POOL_SIZE: usize = 200;
const BUDGET: u64 = 40_000;

fn sample_pool() -> Mempool {
    let mut pool = Mempool::new();
    pool.add("P", 1_000, 400, []).expect("add P");
    pool.add("C", 80_000, 300, ["P".to_string()]).expect("add C");
    for i in 0..POOL_SIZE {
        pool.add(format!("filler{i}"), 10_000 + i as u64 * 37, 400, []).expect("add filler");
    }
    pool
}

fn bench_greedy(c: &mut Criterion) {
    let pool = sample_pool();
    c.bench_function("selection_greedy", |b| {
        b.iter(|| greedy::select(black_box(&pool), black_box(BUDGET)))
    });
}

fn bench_knapsack(c: &mut Criterion) {
    let pool = sample_pool();
    c.bench_function("selection_knapsack", |b| {
        b.iter(|| knapsack::select(black_box(&pool), black_box(BUDGET)))
    });
}

fn bench_ancestor(c: &mut Criterion) {
    let pool = sample_pool();
    c.bench_function("selection_ancestor_set", |b| {
        b.iter(|| ancestor::select(black_box(&pool), black_box(BUDGET)))
    });
}

fn bench_annealing(c: &mut Criterion) {
    let pool = sample_pool();
    c.bench_function("selection_annealing", |b| {
        b.iter(|| annealing::select(black_box(&pool), black_box(BUDGET), black_box(42)))
    });
}

criterion_group!(benches, bench_greedy, bench_knapsack, bench_ancestor, bench_annealing);
criterion_main!(benches);
