// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! FRNN Grid: batched fixed-radius nearest-neighbor search over 3D point clouds.
//!
//! For every query point, find up to `K` reference points within radius `r`,
//! ordered by squared distance.
//!
//! - Batches are ragged: each of `N` clouds has its own point count, bounding box
//!   and grid resolution, but all share fixed-shape, batch-major buffers.
//! - A uniform grid is built over each reference cloud once; each query only
//!   visits the cells overlapping the cube of half-width `r` around it.
//! - Results keep the `K` closest candidates in a bounded max-heap and come out
//!   in ascending distance order, padded with `-1` sentinels.
//!
//! The pipeline runs five stages per batch element:
//!
//! 1. [`build_grid_params`]: origin, inverse cell size and resolution from a bounding box.
//! 2. [`insert_points`]: flat cell id and bucket-local rank for every reference point.
//! 3. [`scan`]: exclusive prefix sum of bucket counts into bucket offsets.
//! 4. [`scatter`]: counting sort of reference points into cell-contiguous order.
//! 5. [`find_neighbors`]: bounded range query per query point.
//!
//! [`Grid`] runs stages 1–4 once and answers any number of queries;
//! [`frnn_grid_points`] runs everything in one call.
//!
//! # Example
//!
//! ```rust
//! use frnn_grid::{Batched, FrnnOptions, Grid};
//!
//! let reference = Batched::from_rows(
//!     vec![vec![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [2.0, 0.0, 0.0]]],
//!     3,
//!     [0.0; 3],
//! )?;
//! let query = Batched::from_rows(vec![vec![[0.0, 0.0, 0.0]]], 1, [0.0; 3])?;
//!
//! let grid = Grid::build(&reference, &[3], &FrnnOptions::new(2, 1.0))?;
//! let nb = grid.query(&query, &[1])?;
//! assert_eq!(nb.idxs(0, 0), &[0, 1]);
//! assert_eq!(nb.dists(0, 0), &[0.0, 0.25]);
//! # Ok::<(), frnn_grid::FrnnError>(())
//! ```
//!
//! ## Backends
//!
//! Stages are scheduled by a [`Backend`]:
//!
//! - [`Serial`] (default): everything on the calling thread.
//! - `Parallel` (feature `rayon`): batch elements and query points on the rayon
//!   pool. Output is identical to `Serial`.
//!
//! ### Tie-break
//!
//! When several candidates are equally distant at the `K`-th slot, the ones
//! offered first win. Cells are visited with x outermost, then y, then z, each
//! ascending; within a cell, points are visited in sorted-layout order, which is
//! original index order. When a strictly closer candidate arrives, the evicted
//! entry is the one with the largest original index among those at the maximum
//! distance. The result is reproducible for a fixed input.
//!
//! ### Float semantics
//!
//! The radius is inclusive: a point at squared distance exactly `r * r` is a
//! neighbor. Coordinates must not be NaN; insertion rejects them.

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod batch;
pub mod brute;
pub mod error;
pub mod gather;
pub mod grid;
pub mod insert;
pub mod options;
pub mod params;
pub mod query;
pub mod types;

pub use backend::Backend;
#[cfg(feature = "rayon")]
pub use backends::Parallel;
pub use backends::Serial;
pub use batch::Batched;
pub use brute::find_neighbors_brute_force;
pub use error::{FrnnError, Result};
pub use gather::gather_neighbors;
pub use grid::{Grid, SortedLayout, frnn_grid_points, grid_insert_points, scan, scatter};
pub use insert::{BucketState, insert_points};
pub use options::{BoxSource, FrnnOptions};
pub use params::{GridParams, bounding_boxes, build_batch_params, build_grid_params};
pub use query::{BoundedMaxHeap, NO_DISTANCE, NO_NEIGHBOR, Neighbors, find_neighbors};
pub use types::{Aabb3D, Point3};
