// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Grid` API: build once per reference batch, query many times.

use alloc::vec;
use alloc::vec::Vec;

use crate::backend::Backend;
use crate::backends::Serial;
use crate::batch::{Batched, check_batch, check_lengths};
use crate::error::{FrnnError, Result};
use crate::insert::{BucketState, insert_points};
use crate::options::{BoxSource, FrnnOptions};
use crate::params::{GridParams, bounding_boxes, build_batch_params};
use crate::query::{Neighbors, check_query_args, find_neighbors};
use crate::types::{Aabb3D, Point3};

/// Grids with more than this many cells per valid point are reported as sparse.
const SPARSE_CELLS_PER_POINT: usize = 64;

/// Reference points reordered so each cell's points are contiguous.
///
/// For cell `c` of element `n`, sorted slots `offsets[n][c] .. offsets[n][c] + count[n][c]`
/// hold that cell's points; `index` maps each sorted slot back to the
/// original point index (`-1` in padding).
#[derive(Clone, Debug, PartialEq)]
pub struct SortedLayout {
    /// Sorted reference points, `(N, P2)`.
    pub points: Batched<Point3>,
    /// Original index per sorted slot, `(N, P2)`.
    pub index: Batched<i32>,
    /// Exclusive prefix sum of bucket counts, `(N, max_total_cells)`.
    pub offsets: Batched<u32>,
}

/// Bucket offsets: the exclusive prefix sum of every row of `counts`.
pub fn scan<B: Backend>(counts: &Batched<u32>, backend: &B) -> Batched<u32> {
    backend.scan(counts)
}

/// Counting-sort the valid points of each element into cell-contiguous order.
///
/// Point `p` with cell `c` and rank `k` lands at sorted slot `offsets[c] + k`.
/// Fails if the per-point arrays disagree with `points`, if any scatter
/// address falls outside the valid prefix of its row, or if two points share
/// an address.
pub fn scatter<B: Backend>(
    points: &Batched<Point3>,
    lengths: &[usize],
    cells: &Batched<i32>,
    ranks: &Batched<i32>,
    offsets: &Batched<u32>,
    backend: &B,
) -> Result<SortedLayout> {
    let batch = points.batch_len();
    check_lengths("lengths", lengths, batch, points.width())?;
    for (what, b) in [
        ("cell ids", cells.batch_len()),
        ("ranks", ranks.batch_len()),
        ("bucket offsets", offsets.batch_len()),
    ] {
        check_batch(what, batch, b)?;
    }
    for (what, w) in [("cell ids", cells.width()), ("ranks", ranks.width())] {
        if w != points.width() {
            return Err(FrnnError::ShapeMismatch {
                what,
                expected: points.width(),
                actual: w,
            });
        }
    }
    for (n, &len) in lengths.iter().enumerate() {
        let (c_row, r_row, o_row) = (cells.row(n), ranks.row(n), offsets.row(n));
        let mut taken = vec![false; len];
        for p in 0..len {
            let addr = usize::try_from(c_row[p])
                .ok()
                .and_then(|c| o_row.get(c))
                .zip(usize::try_from(r_row[p]).ok())
                .map(|(&o, k)| o as usize + k);
            // Each valid slot must be written exactly once.
            match addr {
                Some(a) if a < len && !taken[a] => taken[a] = true,
                _ => return Err(FrnnError::InvalidScatterAddress { batch: n, index: p }),
            }
        }
    }

    let (sorted_points, sorted_index) = backend.scatter(points, lengths, cells, ranks, offsets);
    Ok(SortedLayout {
        points: sorted_points,
        index: sorted_index,
        offsets: offsets.clone(),
    })
}

/// A uniform grid over a batch of reference point clouds.
///
/// Building runs insertion, scan and scatter once; every later [`Grid::query`]
/// only runs the bounded range query against the stored layout.
#[derive(Debug)]
pub struct Grid<B: Backend = Serial> {
    options: FrnnOptions,
    params: Vec<GridParams>,
    lengths: Vec<usize>,
    buckets: BucketState,
    layout: SortedLayout,
    backend: B,
}

impl Grid<Serial> {
    /// Build a grid over `points` with the serial backend.
    pub fn build(
        points: &Batched<Point3>,
        lengths: &[usize],
        options: &FrnnOptions,
    ) -> Result<Self> {
        Self::build_with(points, lengths, options, Serial)
    }
}

impl<B: Backend> Grid<B> {
    /// Build a grid over `points` with an explicit backend.
    pub fn build_with(
        points: &Batched<Point3>,
        lengths: &[usize],
        options: &FrnnOptions,
        backend: B,
    ) -> Result<Self> {
        options.validate()?;
        check_lengths("lengths", lengths, points.batch_len(), points.width())?;
        let bboxes = match &options.bboxes {
            BoxSource::FromPoints => bounding_boxes(points, lengths)?,
            BoxSource::Explicit(b) => {
                check_batch("bounding boxes", points.batch_len(), b.len())?;
                b.clone()
            }
        };
        let cell_size = options.cell_size();
        let (params, max_total) = build_batch_params(&bboxes, cell_size)?;
        let buckets = insert_points(points, lengths, &params, &backend)?;
        let offsets = scan(&buckets.count, &backend);
        let layout = scatter(points, lengths, &buckets.cell, &buckets.rank, &offsets, &backend)?;

        log::debug!(
            "built grid: {} elements, cell size {cell_size}, max cells {max_total}, {} points",
            params.len(),
            lengths.iter().sum::<usize>()
        );
        for (n, (p, &len)) in params.iter().zip(lengths).enumerate() {
            if p.total > SPARSE_CELLS_PER_POINT * len.max(1) {
                log::warn!(
                    "grid of element {n} has {} cells for {len} points; consider a smaller radius_cell_ratio",
                    p.total
                );
            }
        }

        Ok(Self {
            options: options.clone(),
            params,
            lengths: lengths.to_vec(),
            buckets,
            layout,
            backend,
        })
    }

    /// Query with the `K` and radius the grid was built with.
    pub fn query(&self, query: &Batched<Point3>, query_lengths: &[usize]) -> Result<Neighbors> {
        self.query_with(query, query_lengths, self.options.k, self.options.radius)
    }

    /// Query with a different `K` or radius.
    ///
    /// Any positive radius is correct; the cell size only affects how many
    /// cells each query visits.
    pub fn query_with(
        &self,
        query: &Batched<Point3>,
        query_lengths: &[usize],
        k: usize,
        r: f32,
    ) -> Result<Neighbors> {
        find_neighbors(
            query,
            query_lengths,
            &self.layout,
            &self.lengths,
            &self.params,
            k,
            r,
            &self.backend,
        )
    }

    /// The options the grid was built with.
    pub fn options(&self) -> &FrnnOptions {
        &self.options
    }

    /// Grid geometry per batch element.
    pub fn params(&self) -> &[GridParams] {
        &self.params
    }

    /// Valid reference point count per batch element.
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Raw bucket state from insertion.
    pub fn buckets(&self) -> &BucketState {
        &self.buckets
    }

    /// The cell-sorted reference layout.
    pub fn layout(&self) -> &SortedLayout {
        &self.layout
    }
}

/// Build grids with cell size `r` and insert `points`, returning the raw bucket
/// state as `(counts, cell ids, ranks)`.
pub fn grid_insert_points(
    bboxes: &[Aabb3D],
    points: &Batched<Point3>,
    lengths: &[usize],
    r: f32,
) -> Result<(Batched<u32>, Batched<i32>, Batched<i32>)> {
    check_batch("bounding boxes", points.batch_len(), bboxes.len())?;
    let (params, _) = build_batch_params(bboxes, r)?;
    let state = insert_points(points, lengths, &params, &Serial)?;
    Ok((state.count, state.cell, state.rank))
}

/// Run the full pipeline with cell size `r`: build params from `bboxes`, insert
/// `reference`, scan, scatter, and query every valid point of `query`.
pub fn frnn_grid_points(
    bboxes: &[Aabb3D],
    query: &Batched<Point3>,
    reference: &Batched<Point3>,
    query_lengths: &[usize],
    ref_lengths: &[usize],
    k: usize,
    r: f32,
) -> Result<Neighbors> {
    check_query_args(k, r)?;
    check_batch("reference points", query.batch_len(), reference.batch_len())?;
    let options = FrnnOptions::new(k, r).with_bboxes(bboxes.to_vec());
    Grid::build(reference, ref_lengths, &options)?.query(query, query_lengths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn cloud(rows: Vec<Vec<Point3>>, width: usize) -> Batched<Point3> {
        Batched::from_rows(rows, width, [0.0; 3]).unwrap()
    }

    #[test]
    fn sorted_layout_is_cell_contiguous() {
        let points = cloud(
            vec![vec![
                [1.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [1.2, 0.1, 0.9],
                [0.1, 0.9, 0.2],
                [1.9, 0.2, 0.3],
            ]],
            6,
        );
        let bbox = Aabb3D::new(0.0, 0.0, 0.0, 2.0, 1.0, 1.0);
        let options = FrnnOptions::new(1, 1.0).with_bboxes(vec![bbox]);
        let grid = Grid::build(&points, &[5], &options).unwrap();

        let layout = grid.layout();
        assert_eq!(layout.offsets.row(0), &[0, 2]);
        assert_eq!(layout.index.row(0), &[1, 3, 0, 2, 4, -1]);
        let p = grid.params()[0];
        for (slot, &orig) in layout.index.row(0)[..5].iter().enumerate() {
            let sorted = layout.points.row(0)[slot];
            assert_eq!(sorted, points.row(0)[orig as usize]);
            let expected_cell = if slot < 2 { 0 } else { 1 };
            assert_eq!(p.cell_of(sorted), expected_cell);
        }
    }

    #[test]
    fn scatter_rejects_out_of_range_addresses() {
        let points = cloud(vec![vec![[0.0; 3], [1.0; 3]]], 2);
        let cells = Batched::from_vec(vec![0, 0], 1, 2).unwrap();
        let ranks = Batched::from_vec(vec![0, 5], 1, 2).unwrap();
        let offsets = Batched::from_vec(vec![0], 1, 1).unwrap();
        assert!(matches!(
            scatter(&points, &[2], &cells, &ranks, &offsets, &Serial),
            Err(FrnnError::InvalidScatterAddress { batch: 0, index: 1 })
        ));
    }

    #[test]
    fn scatter_rejects_colliding_addresses() {
        let points = cloud(vec![vec![[0.0; 3], [0.1, 0.0, 0.0]]], 2);
        let cells = Batched::from_vec(vec![0, 0], 1, 2).unwrap();
        let ranks = Batched::from_vec(vec![0, 0], 1, 2).unwrap();
        let offsets = Batched::from_vec(vec![0], 1, 1).unwrap();
        assert!(matches!(
            scatter(&points, &[2], &cells, &ranks, &offsets, &Serial),
            Err(FrnnError::InvalidScatterAddress { batch: 0, index: 1 })
        ));
    }

    #[test]
    fn insert_wrapper_returns_counts_cells_and_ranks() {
        let points = cloud(vec![vec![[0.1, 0.1, 0.1], [0.2, 0.2, 0.2], [1.5, 0.5, 0.5]]], 3);
        let bboxes = [Aabb3D::new(0.0, 0.0, 0.0, 2.0, 1.0, 1.0)];
        let (counts, cells, ranks) = grid_insert_points(&bboxes, &points, &[3], 1.0).unwrap();
        assert_eq!(counts.row(0), &[2, 1]);
        assert_eq!(cells.row(0), &[0, 0, 1]);
        assert_eq!(ranks.row(0), &[0, 1, 0]);
    }

    #[test]
    fn grid_is_reusable_across_queries() {
        let reference = cloud(vec![vec![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [2.0, 0.0, 0.0]]], 3);
        let grid = Grid::build(&reference, &[3], &FrnnOptions::new(2, 1.0)).unwrap();

        let q1 = cloud(vec![vec![[0.0, 0.0, 0.0]]], 1);
        let q2 = cloud(vec![vec![[2.0, 0.0, 0.0]]], 1);
        assert_eq!(grid.query(&q1, &[1]).unwrap().idxs(0, 0), &[0, 1]);
        assert_eq!(grid.query(&q2, &[1]).unwrap().idxs(0, 0), &[2, -1]);
        let wide = grid.query_with(&q2, &[1], 3, 2.0).unwrap();
        assert_eq!(wide.idxs(0, 0), &[2, 1, 0]);
        assert_eq!(wide.dists(0, 0), &[0.0, 2.25, 4.0]);
    }

    #[test]
    fn mismatched_batches_are_rejected() {
        let reference = cloud(vec![vec![[0.0; 3]], vec![[0.0; 3]]], 1);
        let query = cloud(vec![vec![[0.0; 3]]], 1);
        let bboxes = [Aabb3D::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0); 2];
        assert!(matches!(
            frnn_grid_points(&bboxes, &query, &reference, &[1], &[1, 1], 1, 1.0),
            Err(FrnnError::BatchMismatch { .. })
        ));
        assert!(matches!(
            grid_insert_points(&bboxes[..1], &reference, &[1, 1], 1.0),
            Err(FrnnError::BatchMismatch { .. })
        ));
    }
}
