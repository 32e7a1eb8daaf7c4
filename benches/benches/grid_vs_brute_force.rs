// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use frnn_grid::{Batched, FrnnOptions, Grid, Point3, find_neighbors_brute_force};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn gen_uniform_batch(batch: usize, n: usize, extent: f32, seed: u64) -> Batched<Point3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let rows = (0..batch)
        .map(|_| {
            (0..n)
                .map(|_| [0, 1, 2].map(|_| rng.gen_range(0.0..extent)))
                .collect()
        })
        .collect();
    Batched::from_rows(rows, n, [0.0; 3]).expect("rows fit the padded width")
}

/// Ragged batch: element `i` keeps `n >> i` points, the rest is padding.
fn gen_ragged_batch(batch: usize, n: usize, extent: f32, seed: u64) -> (Batched<Point3>, Vec<usize>) {
    let full = gen_uniform_batch(batch, n, extent, seed);
    let lengths = (0..batch).map(|i| (n >> i).max(1)).collect();
    (full, lengths)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_build");
    for &n in &[1_000_usize, 10_000, 100_000] {
        let points = gen_uniform_batch(4, n, 10.0, 0xCAFE_F00D_DEAD_BEEF);
        let lengths = vec![n; 4];
        let options = FrnnOptions::new(8, 0.2);
        group.throughput(Throughput::Elements((4 * n) as u64));
        group.bench_function(format!("build_n{}", n), |b| {
            b.iter(|| {
                let grid = Grid::build(&points, &lengths, &options).expect("valid input");
                black_box(grid.params().len());
            });
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_query");
    for &n in &[1_000_usize, 10_000, 100_000] {
        let reference = gen_uniform_batch(2, n, 10.0, 0xBADC_F00D_1234_5678);
        let query = gen_uniform_batch(2, n, 10.0, 0xC1A5_7E55_9999_ABCD);
        let lengths = vec![n; 2];
        group.throughput(Throughput::Elements((2 * n) as u64));
        for &ratio in &[1.0_f32, 2.0] {
            let options = FrnnOptions::new(8, 0.2).with_radius_cell_ratio(ratio);
            let grid = Grid::build(&reference, &lengths, &options).expect("valid input");
            group.bench_function(format!("query_n{}_ratio{}", n, ratio), |b| {
                b.iter(|| {
                    let nb = grid.query(&query, &lengths).expect("valid input");
                    black_box(nb.idxs_flat().len());
                });
            });
        }
    }
    group.finish();
}

fn bench_brute_force(c: &mut Criterion) {
    let mut group = c.benchmark_group("brute_force");
    for &n in &[1_000_usize, 4_000] {
        let reference = gen_uniform_batch(1, n, 10.0, 1);
        let query = gen_uniform_batch(1, n, 10.0, 2);
        let lengths = [n];
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("brute_n{}", n), |b| {
            b.iter(|| {
                let nb = find_neighbors_brute_force(&query, &reference, &lengths, &lengths, 8, 0.2)
                    .expect("valid input");
                black_box(nb.idxs_flat().len());
            });
        });
        let options = FrnnOptions::new(8, 0.2);
        group.bench_function(format!("grid_build_query_n{}", n), |b| {
            b.iter_batched(
                || (),
                |()| {
                    let grid = Grid::build(&reference, &lengths, &options).expect("valid input");
                    let nb = grid.query(&query, &lengths).expect("valid input");
                    black_box(nb.idxs_flat().len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_ragged(c: &mut Criterion) {
    let mut group = c.benchmark_group("ragged_batch");
    let (reference, lengths) = gen_ragged_batch(8, 32_768, 10.0, 0xFACE_FEED_CAFE_BABE);
    let (query, _) = gen_ragged_batch(8, 32_768, 10.0, 0x5EED);
    let options = FrnnOptions::new(16, 0.3);
    group.throughput(Throughput::Elements(lengths.iter().sum::<usize>() as u64));
    group.bench_function("build_query_serial", |b| {
        b.iter(|| {
            let grid = Grid::build(&reference, &lengths, &options).expect("valid input");
            black_box(grid.query(&query, &lengths).expect("valid input").k());
        });
    });
    #[cfg(feature = "parallel")]
    group.bench_function("build_query_parallel", |b| {
        b.iter(|| {
            let grid = Grid::build_with(&reference, &lengths, &options, frnn_grid::Parallel)
                .expect("valid input");
            black_box(grid.query(&query, &lengths).expect("valid input").k());
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_query,
    bench_brute_force,
    bench_ragged,
);
criterion_main!(benches);
