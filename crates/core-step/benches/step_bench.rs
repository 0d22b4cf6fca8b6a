//! Generator throughput: SWAR stepper vs the per-cell oracle on a grown
//! r-pentomino soup (a few hundred chunks of organic structure).

use core_grid::ChunkStore;
use core_rule::Rule;
use core_step::{step, step_reference};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn grown_soup(generations: usize) -> ChunkStore {
    let rule = Rule::default();
    let mut store = ChunkStore::new();
    // r-pentomino: the classic long-lived methuselah.
    for &(x, y) in &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)] {
        store.set_cell(x, y, true);
    }
    for _ in 0..generations {
        store = step(&store, &rule);
    }
    store
}

fn bench_step(c: &mut Criterion) {
    let rule = Rule::default();
    let soup = grown_soup(300);

    let mut group = c.benchmark_group("generation");
    group.bench_function("swar", |b| {
        b.iter(|| step(black_box(&soup), black_box(&rule)));
    });
    group.bench_function("reference", |b| {
        b.iter(|| step_reference(black_box(&soup), black_box(&rule)));
    });
    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
