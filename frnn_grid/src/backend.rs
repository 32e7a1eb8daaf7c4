// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Execution backend trait for the batched grid stages.

use core::fmt::Debug;

use crate::batch::Batched;
use crate::insert::BucketState;
use crate::params::GridParams;
use crate::query::Neighbors;
use crate::types::Point3;

/// Execution strategy used by the grid stages.
///
/// Implementations only decide how work is scheduled. Every stage must produce
/// the same output as [`Serial`](crate::backends::Serial): per-element insertion
/// stays in point order, and each query row is computed independently.
///
/// Inputs are validated by the public entry points before a backend sees them.
pub trait Backend: Debug + Sync {
    /// Insert each element's valid points into `state`, which arrives zeroed.
    fn insert(
        &self,
        points: &Batched<Point3>,
        lengths: &[usize],
        params: &[GridParams],
        state: &mut BucketState,
    );

    /// Exclusive prefix sum of each row of `counts`.
    fn scan(&self, counts: &Batched<u32>) -> Batched<u32>;

    /// Scatter valid points into cell-contiguous order.
    ///
    /// Point `p` of element `n` with cell `c` and rank `k` lands at
    /// `offsets[n][c] + k`. Returns the sorted points and, per sorted slot, the
    /// original index (`-1` in padding).
    fn scatter(
        &self,
        points: &Batched<Point3>,
        lengths: &[usize],
        cells: &Batched<i32>,
        ranks: &Batched<i32>,
        offsets: &Batched<u32>,
    ) -> (Batched<Point3>, Batched<i32>);

    /// Call `f(row, idxs, dists)` for every query row of `out`.
    ///
    /// `row` is the flat query index `n * P1 + p`; `idxs` and `dists` are that
    /// row's `K` result slots.
    fn for_each_query<F>(&self, out: &mut Neighbors, f: F)
    where
        F: Fn(usize, &mut [i64], &mut [f32]) + Sync + Send;
}
