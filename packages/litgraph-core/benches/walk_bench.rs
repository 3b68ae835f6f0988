//! Benchmarks for walk sampling and transition-matrix derivation on a
//! synthetic literature hypergraph.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use litgraph_core::{
    sample_walk, transition_probabilities, GraphDimensions, IncidenceMatrix, WeightingPolicy,
};

/// 2000 papers, 500 authors, 300 chemicals, 1 keyword; 3-8 nodes per paper.
fn synthetic() -> (IncidenceMatrix, GraphDimensions) {
    let dims = GraphDimensions::new(500, 300, 0, 1);
    let mut rng = StdRng::seed_from_u64(13);
    let kw = dims.property_keyword() as u32;
    let rows = (0..2000)
        .map(|_| {
            let mut cols: Vec<u32> = (0..rng.gen_range(2..6))
                .map(|_| rng.gen_range(0..500))
                .collect();
            cols.extend((0..rng.gen_range(1..3)).map(|_| 500 + rng.gen_range(0..300)));
            if rng.gen_bool(0.05) {
                cols.push(kw);
            }
            cols
        })
        .collect();
    (
        IncidenceMatrix::from_rows(rows, dims.total_nodes()),
        dims,
    )
}

fn bench_transition(c: &mut Criterion) {
    let (r, _) = synthetic();
    c.bench_function("transition_probabilities_2000x801", |b| {
        b.iter(|| transition_probabilities(black_box(&r)))
    });
}

fn bench_sample_walk(c: &mut Criterion) {
    let (r, dims) = synthetic();
    let policy = WeightingPolicy::AlphaRatio(1.0);
    c.bench_function("sample_walk_len20", |b| {
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| {
            sample_walk(
                black_box(&r),
                &dims,
                dims.property_keyword(),
                20,
                false,
                &policy,
                &mut rng,
            )
        })
    });
}

criterion_group!(benches, bench_transition, bench_sample_walk);
criterion_main!(benches);
