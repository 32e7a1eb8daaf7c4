// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rayon backend: batch elements and query points run on the global thread pool.

use alloc::vec::Vec;

use rayon::prelude::*;

use crate::backend::Backend;
use crate::batch::Batched;
use crate::insert::{BucketState, EMPTY, insert_row};
use crate::params::GridParams;
use crate::query::Neighbors;
use crate::types::Point3;

use super::{exclusive_scan_row, scatter_row};

/// Parallel backend built on rayon.
///
/// Insertion, scan and scatter are parallel across batch elements and
/// sequential within one, so bucket ranks match [`Serial`](super::Serial)
/// exactly. Queries are parallel across all query rows; each row owns its
/// result slots and only reads the shared grid.
///
/// Point-parallel insertion with per-cell atomic counters is not implemented:
/// it would make ranks depend on scheduling within a cell.
#[derive(Copy, Clone, Debug, Default)]
pub struct Parallel;

impl Backend for Parallel {
    fn insert(
        &self,
        points: &Batched<Point3>,
        lengths: &[usize],
        params: &[GridParams],
        state: &mut BucketState,
    ) {
        state
            .rows_mut()
            .into_par_iter()
            .enumerate()
            .for_each(|(n, row)| insert_row(points.row(n), lengths[n], &params[n], row));
    }

    fn scan(&self, counts: &Batched<u32>) -> Batched<u32> {
        let mut offsets = Batched::filled(counts.batch_len(), counts.width(), 0);
        let rows: Vec<&mut [u32]> = offsets.rows_mut().collect();
        rows.into_par_iter()
            .enumerate()
            .for_each(|(n, row)| exclusive_scan_row(counts.row(n), row));
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
        let rows: Vec<(&mut [Point3], &mut [i32])> = sorted_points
            .rows_mut()
            .zip(sorted_index.rows_mut())
            .collect();
        rows.into_par_iter()
            .enumerate()
            .for_each(|(n, (dst_points, dst_index))| {
                scatter_row(
                    points.row(n),
                    lengths[n],
                    cells.row(n),
                    ranks.row(n),
                    offsets.row(n),
                    dst_points,
                    dst_index,
                );
            });
        (sorted_points, sorted_index)
    }

    fn for_each_query<F>(&self, out: &mut Neighbors, f: F)
    where
        F: Fn(usize, &mut [i64], &mut [f32]) + Sync + Send,
    {
        let k = out.k().max(1);
        let (idxs, dists) = out.slots_mut();
        idxs.par_chunks_mut(k)
            .zip(dists.par_chunks_mut(k))
            .enumerate()
            .for_each(|(row, (i, d))| f(row, i, d));
    }
}
