// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid insertion: assign reference points to cells and rank them within their bucket.

use alloc::vec::Vec;

use crate::backend::Backend;
use crate::batch::{Batched, check_batch, check_lengths};
use crate::error::{FrnnError, Result};
use crate::params::GridParams;
use crate::types::Point3;

/// Sentinel for "no point" in head/next/cell/rank slots.
pub const EMPTY: i32 = -1;

/// Raw bucket state produced by insertion.
///
/// Per cell, `head` is the most recently inserted point and `count` the bucket
/// size. Per point, `next` links to the previous head of its cell (a LIFO chain)
/// and `rank` is the number of same-cell points inserted before it. Only `cell`,
/// `rank` and `count` feed later stages; `head`/`next` are kept for inspection.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketState {
    /// Latest point per cell, `(N, max_total_cells)`.
    pub head: Batched<i32>,
    /// Bucket size per cell, `(N, max_total_cells)`.
    pub count: Batched<u32>,
    /// Flat cell id per point, `(N, P)`.
    pub cell: Batched<i32>,
    /// Previous head of the point's cell at insertion time, `(N, P)`.
    pub next: Batched<i32>,
    /// Bucket-local insertion rank per point, `(N, P)`.
    pub rank: Batched<i32>,
}

/// Mutable view of one batch element's bucket state.
#[derive(Debug)]
pub(crate) struct BucketRowMut<'a> {
    pub(crate) head: &'a mut [i32],
    pub(crate) count: &'a mut [u32],
    pub(crate) cell: &'a mut [i32],
    pub(crate) next: &'a mut [i32],
    pub(crate) rank: &'a mut [i32],
}

impl BucketState {
    fn empty(batch: usize, points: usize, cells: usize) -> Self {
        Self {
            head: Batched::filled(batch, cells, EMPTY),
            count: Batched::filled(batch, cells, 0),
            cell: Batched::filled(batch, points, EMPTY),
            next: Batched::filled(batch, points, EMPTY),
            rank: Batched::filled(batch, points, EMPTY),
        }
    }

    /// Split into one mutable view per batch element.
    pub(crate) fn rows_mut(&mut self) -> Vec<BucketRowMut<'_>> {
        let batch = self.head.batch_len();
        let mut heads = self.head.rows_mut();
        let mut counts = self.count.rows_mut();
        let mut cells = self.cell.rows_mut();
        let mut nexts = self.next.rows_mut();
        let mut ranks = self.rank.rows_mut();
        (0..batch)
            .map(|_| BucketRowMut {
                head: heads.next().unwrap_or_default(),
                count: counts.next().unwrap_or_default(),
                cell: cells.next().unwrap_or_default(),
                next: nexts.next().unwrap_or_default(),
                rank: ranks.next().unwrap_or_default(),
            })
            .collect()
    }
}

/// Insert every valid point of every batch element into its element's grid.
///
/// Points are visited in increasing index order, so ranks are deterministic.
/// Fails if any valid point lies outside the bounding box its params were
/// built from; nothing is written in that case.
pub fn insert_points<B: Backend>(
    points: &Batched<Point3>,
    lengths: &[usize],
    params: &[GridParams],
    backend: &B,
) -> Result<BucketState> {
    let batch = points.batch_len();
    check_lengths("lengths", lengths, batch, points.width())?;
    check_batch("grid params", batch, params.len())?;
    for (n, (row, (&len, p))) in points.rows().zip(lengths.iter().zip(params)).enumerate() {
        if let Some(index) = row[..len].iter().position(|pt| !p.encloses(*pt)) {
            return Err(FrnnError::PointOutsideBoundingBox { batch: n, index });
        }
    }

    let max_total = params.iter().map(|p| p.total).max().unwrap_or(0);
    let mut state = BucketState::empty(batch, points.width(), max_total);
    backend.insert(points, lengths, params, &mut state);
    Ok(state)
}

/// Insert the first `len` points of one batch element.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Cell ids and point indices fit in i32; totals are checked when params are built."
)]
pub(crate) fn insert_row(points: &[Point3], len: usize, params: &GridParams, row: BucketRowMut<'_>) {
    for (p, point) in points[..len].iter().enumerate() {
        let cell = params.cell_of(*point);
        row.cell[p] = cell as i32;
        row.next[p] = row.head[cell];
        row.rank[p] = row.count[cell] as i32;
        row.head[cell] = p as i32;
        row.count[cell] += 1;
    }
}
