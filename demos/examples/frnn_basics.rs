// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! FRNN basics.
//!
//! Search a small ragged batch of two clouds, then gather neighbor
//! coordinates. Set `RUST_LOG=debug` to see the grid stages.
//!
//! Run:
//! - `cargo run -p frnn_demos --example frnn_basics`

use frnn_grid::{Aabb3D, Batched, FrnnError, frnn_grid_points, gather_neighbors};

fn main() -> Result<(), FrnnError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Element 0 has three points, element 1 only two; the rest is padding.
    let reference = Batched::from_rows(
        vec![
            vec![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [2.0, 0.0, 0.0]],
            vec![[1.0, 1.0, 1.0], [1.2, 1.0, 1.0]],
        ],
        3,
        [0.0; 3],
    )?;
    let query = Batched::from_rows(
        vec![vec![[0.1, 0.0, 0.0], [2.0, 0.1, 0.0]], vec![[1.1, 1.0, 1.0]]],
        2,
        [0.0; 3],
    )?;
    let query_lengths = [2, 1];
    let ref_lengths = [3, 2];

    let bboxes = [
        Aabb3D::new(0.0, 0.0, 0.0, 2.0, 0.1, 0.0),
        Aabb3D::new(1.0, 1.0, 1.0, 1.2, 1.0, 1.0),
    ];
    let nb = frnn_grid_points(&bboxes, &query, &reference, &query_lengths, &ref_lengths, 2, 0.6)?;

    for (n, &len) in query_lengths.iter().enumerate() {
        for p in 0..len {
            let hits: Vec<_> = nb.iter(n, p).collect();
            log::info!("element {n} query {p}: {hits:?}");
        }
    }

    let coords = gather_neighbors(&reference, &nb)?;
    for (n, row) in coords.rows().enumerate() {
        println!("element {n} neighbor coordinates: {row:?}");
    }
    Ok(())
}
