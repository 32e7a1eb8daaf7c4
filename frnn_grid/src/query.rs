// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded fixed-radius range queries over a sorted grid layout.

use alloc::collections::BinaryHeap;
use alloc::vec;
use alloc::vec::Vec;

use crate::backend::Backend;
use crate::batch::{Batched, check_batch, check_lengths};
use crate::error::{FrnnError, Result};
use crate::grid::SortedLayout;
use crate::params::GridParams;
use crate::types::{OrdF32, Point3, dist_sq, floor_to_i32};

/// Index written to result slots that found no neighbor.
pub const NO_NEIGHBOR: i64 = -1;

/// Distance written to result slots that found no neighbor.
pub const NO_DISTANCE: f32 = -1.0;

/// Capacity-`K` max-heap keeping the `K` closest candidates seen so far.
///
/// Entries are ordered by `(squared distance, index)`. Below capacity every
/// candidate is admitted; at capacity a candidate is admitted only if strictly
/// closer than the current maximum, which it replaces. Among equally distant
/// candidates the ones offered first therefore survive, and when a closer one
/// arrives the largest index at the maximum distance is evicted first.
#[derive(Clone, Debug)]
pub struct BoundedMaxHeap {
    heap: BinaryHeap<(OrdF32, i64)>,
    cap: usize,
}

impl BoundedMaxHeap {
    /// An empty heap holding at most `cap` entries.
    pub fn new(cap: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(cap),
            cap,
        }
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the heap holds no entries.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The largest squared distance held, if any.
    pub fn max_dist(&self) -> Option<f32> {
        self.heap.peek().map(|(d, _)| d.0)
    }

    /// Offer a candidate. Returns whether it was admitted.
    pub fn offer(&mut self, dist: f32, index: i64) -> bool {
        if self.heap.len() < self.cap {
            self.heap.push((OrdF32(dist), index));
            return true;
        }
        match self.heap.peek_mut() {
            Some(mut top) if dist < top.0.0 => {
                *top = (OrdF32(dist), index);
                true
            }
            _ => false,
        }
    }

    /// Drain into the leading slots in ascending distance order.
    ///
    /// The maximum goes to slot `len - 1`, the next to `len - 2`, down to slot 0.
    /// Slots at or past `len` are left untouched.
    pub fn drain_into(&mut self, idxs: &mut [i64], dists: &mut [f32]) {
        while let Some((dist, index)) = self.heap.pop() {
            let slot = self.heap.len();
            idxs[slot] = index;
            dists[slot] = dist.0;
        }
    }
}

/// Per-query neighbor results, shaped `(N, P1, K)`.
///
/// Each query's slots hold `(original reference index, squared distance)` in
/// ascending distance order; unfilled slots hold [`NO_NEIGHBOR`] and
/// [`NO_DISTANCE`].
#[derive(Clone, Debug, PartialEq)]
pub struct Neighbors {
    idxs: Vec<i64>,
    dists: Vec<f32>,
    batch: usize,
    queries: usize,
    k: usize,
}

impl Neighbors {
    /// All-sentinel results for `batch` elements of `queries` padded query points.
    pub fn new(batch: usize, queries: usize, k: usize) -> Self {
        Self {
            idxs: vec![NO_NEIGHBOR; batch * queries * k],
            dists: vec![NO_DISTANCE; batch * queries * k],
            batch,
            queries,
            k,
        }
    }

    /// Number of batch elements `N`.
    pub fn batch_len(&self) -> usize {
        self.batch
    }

    /// Padded query count `P1`.
    pub fn queries(&self) -> usize {
        self.queries
    }

    /// Slots per query `K`.
    pub fn k(&self) -> usize {
        self.k
    }

    fn slot_range(&self, n: usize, p: usize) -> core::ops::Range<usize> {
        let start = (n * self.queries + p) * self.k;
        start..start + self.k
    }

    /// Neighbor indices of query `p` in element `n`.
    pub fn idxs(&self, n: usize, p: usize) -> &[i64] {
        &self.idxs[self.slot_range(n, p)]
    }

    /// Squared distances of query `p` in element `n`.
    pub fn dists(&self, n: usize, p: usize) -> &[f32] {
        &self.dists[self.slot_range(n, p)]
    }

    /// Filled `(index, squared distance)` pairs of query `p` in element `n`.
    pub fn iter(&self, n: usize, p: usize) -> impl Iterator<Item = (i64, f32)> + '_ {
        self.idxs(n, p)
            .iter()
            .copied()
            .zip(self.dists(n, p).iter().copied())
            .take_while(|&(i, _)| i != NO_NEIGHBOR)
    }

    /// Number of filled slots of query `p` in element `n`.
    pub fn found(&self, n: usize, p: usize) -> usize {
        self.iter(n, p).count()
    }

    /// Flat `(N, P1, K)` index buffer.
    pub fn idxs_flat(&self) -> &[i64] {
        &self.idxs
    }

    /// Flat `(N, P1, K)` squared distance buffer.
    pub fn dists_flat(&self) -> &[f32] {
        &self.dists
    }

    /// Consume into the flat index and distance buffers.
    pub fn into_parts(self) -> (Vec<i64>, Vec<f32>) {
        (self.idxs, self.dists)
    }

    pub(crate) fn slots_mut(&mut self) -> (&mut [i64], &mut [f32]) {
        (&mut self.idxs, &mut self.dists)
    }
}

pub(crate) fn check_query_args(k: usize, r: f32) -> Result<()> {
    if k == 0 {
        return Err(FrnnError::ZeroNeighbors);
    }
    if !(r > 0.0) || r.is_infinite() {
        return Err(FrnnError::NonPositiveRadius(r));
    }
    Ok(())
}

/// Check that a sorted layout matches `params` and `ref_lengths`.
///
/// Offsets must be non-decreasing and never pass the element's valid length,
/// so every cell range read by a query stays inside the valid prefix. Every
/// sorted slot in that prefix must map back to a valid reference index.
pub(crate) fn check_layout(
    layout: &SortedLayout,
    ref_lengths: &[usize],
    params: &[GridParams],
) -> Result<()> {
    let batch = layout.points.batch_len();
    check_lengths("reference lengths", ref_lengths, batch, layout.points.width())?;
    check_batch("grid params", batch, params.len())?;
    check_batch("sorted index", batch, layout.index.batch_len())?;
    check_batch("bucket offsets", batch, layout.offsets.batch_len())?;
    if layout.index.width() != layout.points.width() {
        return Err(FrnnError::ShapeMismatch {
            what: "sorted index",
            expected: layout.points.width(),
            actual: layout.index.width(),
        });
    }
    for (n, p) in params.iter().enumerate() {
        let offsets = layout.offsets.row(n);
        if offsets.len() < p.total {
            return Err(FrnnError::ShapeMismatch {
                what: "bucket offsets",
                expected: p.total,
                actual: offsets.len(),
            });
        }
        let mut prev = 0;
        for &o in &offsets[..p.total] {
            let o = o as usize;
            if o < prev || o > ref_lengths[n] {
                return Err(FrnnError::ShapeMismatch {
                    what: "bucket offsets",
                    expected: ref_lengths[n],
                    actual: o,
                });
            }
            prev = o;
        }
        let len = ref_lengths[n];
        if let Some(&bad) = layout.index.row(n)[..len]
            .iter()
            .find(|&&i| usize::try_from(i).ok().is_none_or(|i| i >= len))
        {
            return Err(FrnnError::ShapeMismatch {
                what: "sorted index",
                expected: len,
                actual: usize::try_from(bad).unwrap_or(usize::MAX),
            });
        }
    }
    Ok(())
}

/// Find up to `k` reference points within `r` of every valid query point.
///
/// `layout` is the cell-sorted reference set produced by scan and scatter for
/// the same `params`. Results are ascending by squared distance; a point
/// exactly at distance `r` is included. Query rows at or past
/// `query_lengths[n]` keep their sentinels.
pub fn find_neighbors<B: Backend>(
    query: &Batched<Point3>,
    query_lengths: &[usize],
    layout: &SortedLayout,
    ref_lengths: &[usize],
    params: &[GridParams],
    k: usize,
    r: f32,
    backend: &B,
) -> Result<Neighbors> {
    check_query_args(k, r)?;
    let batch = query.batch_len();
    check_lengths("query lengths", query_lengths, batch, query.width())?;
    check_batch("sorted points", batch, layout.points.batch_len())?;
    check_layout(layout, ref_lengths, params)?;
    log::debug!(
        "range query: {batch} elements, {} padded queries, K={k}, r={r}",
        query.width()
    );

    let queries = query.width();
    let mut out = Neighbors::new(batch, queries, k);
    let r2 = r * r;
    backend.for_each_query(&mut out, |row, idxs, dists| {
        let (n, p) = (row / queries, row % queries);
        if p >= query_lengths[n] {
            return;
        }
        let mut heap = BoundedMaxHeap::new(k);
        scan_cells(
            query.row(n)[p],
            layout,
            n,
            ref_lengths[n],
            &params[n],
            r,
            r2,
            &mut heap,
        );
        heap.drain_into(idxs, dists);
    });
    Ok(out)
}

/// Offer every reference point of element `n` within `r` of `q` to `heap`.
///
/// Cells are visited x-major, then y, then z, each ascending; points within a
/// cell in sorted-layout order. That order decides ties at the K-th slot.
fn scan_cells(
    q: Point3,
    layout: &SortedLayout,
    n: usize,
    ref_len: usize,
    params: &GridParams,
    r: f32,
    r2: f32,
    heap: &mut BoundedMaxHeap,
) {
    let points = layout.points.row(n);
    let index = layout.index.row(n);
    let offsets = layout.offsets.row(n);

    let mut lo = [0_i32; 3];
    let mut hi = [0_i32; 3];
    for axis in 0..3 {
        let rel = q[axis] - params.origin[axis];
        let last = params.res[axis] - 1;
        // A point on the far face is stored in the last cell, so the lower bound
        // is clamped into range as well.
        lo[axis] = floor_to_i32((rel - r) * params.inv_cell).clamp(0, last);
        hi[axis] = floor_to_i32((rel + r) * params.inv_cell).min(last);
    }

    for x in lo[0]..=hi[0] {
        for y in lo[1]..=hi[1] {
            for z in lo[2]..=hi[2] {
                let cell = params.cell_id([x, y, z]);
                let start = offsets[cell] as usize;
                let end = if cell + 1 == params.total {
                    ref_len
                } else {
                    offsets[cell + 1] as usize
                };
                for j in start..end {
                    let d = dist_sq(q, points[j]);
                    if d <= r2 {
                        heap.offer(d, i64::from(index[j]));
                    }
                }
            }
        }
    }
}
