// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reuse a grid.
//!
//! Build once over a lattice, then query it with several radii and check the
//! results against the brute-force search. With `--features parallel` the
//! grid is built on the rayon backend.
//!
//! Run:
//! - `cargo run -p frnn_demos --example reuse_grid`
//! - `cargo run -p frnn_demos --example reuse_grid --features parallel`

use frnn_grid::{Batched, FrnnError, FrnnOptions, Grid, Point3, find_neighbors_brute_force};

fn lattice(side: usize, step: f32) -> Vec<Point3> {
    let mut out = Vec::with_capacity(side * side * side);
    for x in 0..side {
        for y in 0..side {
            for z in 0..side {
                out.push([x as f32 * step, y as f32 * step, z as f32 * step]);
            }
        }
    }
    out
}

fn main() -> Result<(), FrnnError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let points = lattice(12, 0.25);
    let n = points.len();
    let reference = Batched::from_vec(points, 1, n)?;
    let query = Batched::from_vec(lattice(6, 0.5), 1, 216)?;

    let options = FrnnOptions::new(32, 0.5).with_radius_cell_ratio(2.0);
    #[cfg(feature = "parallel")]
    let grid = Grid::build_with(&reference, &[n], &options, frnn_grid::Parallel)?;
    #[cfg(not(feature = "parallel"))]
    let grid = Grid::build(&reference, &[n], &options)?;

    let p = &grid.params()[0];
    log::info!("grid resolution {:?}, {} cells", p.res, p.total);

    for r in [0.2_f32, 0.3, 0.5] {
        let nb = grid.query_with(&query, &[216], 32, r)?;
        let oracle = find_neighbors_brute_force(&query, &reference, &[216], &[n], 32, r)?;
        let found: usize = (0..216).map(|p| nb.found(0, p)).sum();
        let agree = nb.dists_flat() == oracle.dists_flat();
        println!("radius {r}: {found} neighbors total, distances match brute force: {agree}");
    }
    Ok(())
}
