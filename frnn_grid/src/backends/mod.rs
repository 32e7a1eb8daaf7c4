// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different execution strategies.
//!
//! - `serial`: single-threaded reference; every stage runs in batch order.
//! - `parallel` (feature `rayon`): rayon across batch elements for insertion,
//!   scan and scatter, and across query points for the range query.
//!
//! Both share the row primitives below, so their outputs are identical.
//!
//! Scan note
//! ---------
//! Bucket offsets are the exclusive prefix sum of per-cell counts:
//!
//! `offset[0] = 0`, `offset[c] = count[0] + ... + count[c - 1]`
//!
//! Empty buckets produce no gap. Cells past a smaller grid's total have count
//! 0, so their offset equals the element's valid point count.

#[cfg(feature = "rayon")]
pub mod parallel;
pub mod serial;

#[cfg(feature = "rayon")]
pub use parallel::Parallel;
pub use serial::Serial;

use crate::types::Point3;

/// Write the exclusive prefix sum of `counts` into `offsets`.
pub fn exclusive_scan_row(counts: &[u32], offsets: &mut [u32]) {
    debug_assert_eq!(counts.len(), offsets.len(), "scan rows must match");
    let mut sum = 0_u32;
    for (offset, &count) in offsets.iter_mut().zip(counts) {
        *offset = sum;
        sum += count;
    }
}

/// Scatter the first `len` points of one element to `offsets[cell] + rank`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Point indices fit in i32; the padded width is an i32-addressable row."
)]
pub fn scatter_row(
    points: &[Point3],
    len: usize,
    cells: &[i32],
    ranks: &[i32],
    offsets: &[u32],
    sorted_points: &mut [Point3],
    sorted_index: &mut [i32],
) {
    for p in 0..len {
        let cell = cells[p] as usize;
        let dst = offsets[cell] as usize + ranks[p] as usize;
        sorted_points[dst] = points[p];
        sorted_index[dst] = p as i32;
    }
}
