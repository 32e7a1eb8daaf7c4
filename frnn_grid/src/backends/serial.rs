// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-threaded backend. Small and simple; the reference for every other backend.

use crate::backend::Backend;
use crate::batch::Batched;
use crate::insert::{BucketState, EMPTY, insert_row};
use crate::params::GridParams;
use crate::query::Neighbors;
use crate::types::Point3;

use super::{exclusive_scan_row, scatter_row};

/// Runs every stage on the calling thread, batch element by batch element.
#[derive(Copy, Clone, Debug, Default)]
pub struct Serial;

impl Backend for Serial {
    fn insert(
        &self,
        points: &Batched<Point3>,
        lengths: &[usize],
        params: &[GridParams],
        state: &mut BucketState,
    ) {
        for (n, row) in state.rows_mut().into_iter().enumerate() {
            insert_row(points.row(n), lengths[n], &params[n], row);
        }
    }

    fn scan(&self, counts: &Batched<u32>) -> Batched<u32> {
        let mut offsets = Batched::filled(counts.batch_len(), counts.width(), 0);
        for (n, row) in offsets.rows_mut().enumerate() {
            exclusive_scan_row(counts.row(n), row);
        }
        offsets
    }

    fn scatter(
        &self,
        points: &Batched<Point3>,
        lengths: &[usize],
        cells: &Batched<i32>,
        ranks: &Batched<i32>,
        offsets: &Batched<u32>,
    ) -> (Batched<Point3>, Batched<i32>) {
        let (batch, width) = (points.batch_len(), points.width());
        let mut sorted_points = Batched::filled(batch, width, [0.0; 3]);
        let mut sorted_index = Batched::filled(batch, width, EMPTY);
        for (n, (dst_points, dst_index)) in sorted_points
            .rows_mut()
            .zip(sorted_index.rows_mut())
            .enumerate()
        {
            scatter_row(
                points.row(n),
                lengths[n],
                cells.row(n),
                ranks.row(n),
                offsets.row(n),
                dst_points,
                dst_index,
            );
        }
        (sorted_points, sorted_index)
    }

    fn for_each_query<F>(&self, out: &mut Neighbors, f: F)
    where
        F: Fn(usize, &mut [i64], &mut [f32]) + Sync + Send,
    {
        let k = out.k().max(1);
        let (idxs, dists) = out.slots_mut();
        for (row, (i, d)) in idxs.chunks_mut(k).zip(dists.chunks_mut(k)).enumerate() {
            f(row, i, d);
        }
    }
}
