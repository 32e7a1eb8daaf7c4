// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use frnn_grid::{Batched, FrnnOptions, Grid, Point3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rstar::RTree;

fn gen_cloud(n: usize, extent: f32, seed: u64) -> Vec<Point3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| [0, 1, 2].map(|_| rng.gen_range(0.0..extent)))
        .collect()
}

fn bench_rstar_external_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_external_compare");
    let k = 8;
    let r = 0.25_f32;
    for &n in &[10_000usize, 50_000] {
        let reference = gen_cloud(n, 10.0, 0x00C0_FFEE);
        let query = gen_cloud(n, 10.0, 0x0BAD_CAFE);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_function(format!("frnn_grid_build_query_n{}", n), |b| {
            b.iter_batched(
                || {
                    (
                        Batched::from_vec(reference.clone(), 1, n).expect("one full row"),
                        Batched::from_vec(query.clone(), 1, n).expect("one full row"),
                    )
                },
                |(reference, query)| {
                    let grid = Grid::build(&reference, &[n], &FrnnOptions::new(k, r))
                        .expect("valid input");
                    let nb = grid.query(&query, &[n]).expect("valid input");
                    black_box(nb.found(0, 0));
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_n{}", n), |b| {
            b.iter_batched(
                || reference.clone(),
                |points| {
                    let tree = RTree::bulk_load(points);
                    let mut hits = 0_usize;
                    for q in &query {
                        let mut found: Vec<(f32, &Point3)> = tree
                            .locate_within_distance(*q, r * r)
                            .map(|p| {
                                let d = (0..3).map(|i| (p[i] - q[i]) * (p[i] - q[i])).sum();
                                (d, p)
                            })
                            .collect();
                        found.sort_by(|a, b| a.0.total_cmp(&b.0));
                        found.truncate(k);
                        hits += found.len();
                    }
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rstar_external_compare);
criterion_main!(benches);
