// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Brute-force fixed-radius search. Quadratic; used as an oracle and a baseline.

use crate::batch::{Batched, check_batch, check_lengths};
use crate::error::Result;
use crate::query::{BoundedMaxHeap, Neighbors, check_query_args};
use crate::types::{Point3, dist_sq};

/// Compare every valid query point against every valid reference point.
///
/// Candidates are offered in reference index order, so ties at the `K`-th slot
/// may resolve differently from the grid search; the returned distances agree.
pub fn find_neighbors_brute_force(
    query: &Batched<Point3>,
    reference: &Batched<Point3>,
    query_lengths: &[usize],
    ref_lengths: &[usize],
    k: usize,
    r: f32,
) -> Result<Neighbors> {
    check_query_args(k, r)?;
    let batch = query.batch_len();
    check_batch("reference points", batch, reference.batch_len())?;
    check_lengths("query lengths", query_lengths, batch, query.width())?;
    check_lengths("reference lengths", ref_lengths, batch, reference.width())?;

    let r2 = r * r;
    let queries = query.width();
    let mut out = Neighbors::new(batch, queries, k);
    let mut heap = BoundedMaxHeap::new(k);
    let (idxs, dists) = out.slots_mut();
    for n in 0..batch {
        let refs = &reference.row(n)[..ref_lengths[n]];
        for (p, &q) in query.row(n)[..query_lengths[n]].iter().enumerate() {
            for (j, &x) in refs.iter().enumerate() {
                let d = dist_sq(q, x);
                if d <= r2 {
                    heap.offer(d, j as i64);
                }
            }
            let start = (n * queries + p) * k;
            heap.drain_into(&mut idxs[start..start + k], &mut dists[start..start + k]);
        }
    }
    Ok(out)
}
