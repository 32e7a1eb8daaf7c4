// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid geometry for one batch element.

use alloc::vec::Vec;

use crate::batch::{Batched, check_lengths};
use crate::error::{FrnnError, Result};
use crate::types::{Aabb3D, Point3, ceil_to_i32, floor_to_i32};

/// Uniform grid geometry derived from a bounding box and a cell size.
///
/// Cells are addressed by 3D coordinates in `[0, res)` per axis and by a flat
/// id `(gx * ry + gy) * rz + gz`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridParams {
    /// Grid origin, the minimum corner of the bounding box.
    pub origin: Point3,
    /// `1 / cell_size`.
    pub inv_cell: f32,
    /// Cells per axis; each at least 1.
    pub res: [i32; 3],
    /// `res[0] * res[1] * res[2]`.
    pub total: usize,
}

/// Derive grid geometry for `bbox` with cubic cells of side `cell_size`.
///
/// Per-axis resolution is `ceil((max - min) / cell_size)`, clamped to at least 1.
pub fn build_grid_params(bbox: &Aabb3D, cell_size: f32) -> Result<GridParams> {
    build_for_element(0, bbox, cell_size)
}

fn build_for_element(batch: usize, bbox: &Aabb3D, cell_size: f32) -> Result<GridParams> {
    // `!(x > 0)` also rejects NaN.
    if !(cell_size > 0.0) {
        return Err(FrnnError::NonPositiveCellSize(cell_size));
    }
    if bbox.is_inverted() {
        return Err(FrnnError::InvertedBoundingBox { batch });
    }
    let inv_cell = 1.0 / cell_size;
    let (min, max) = (bbox.min(), bbox.max());
    let mut res = [1_i32; 3];
    let mut total = 1_i32;
    for axis in 0..3 {
        let cells = ((max[axis] - min[axis]) * inv_cell).min(i32::MAX as f32);
        res[axis] = ceil_to_i32(cells).max(1);
        total = total
            .checked_mul(res[axis])
            .ok_or(FrnnError::GridTooLarge { batch })?;
    }
    Ok(GridParams {
        origin: min,
        inv_cell,
        res,
        total: usize::try_from(total).map_err(|_| FrnnError::GridTooLarge { batch })?,
    })
}

/// Build params for every batch element.
///
/// Returns the params and the widest total cell count, which sizes the shared
/// bucket arrays of a ragged batch.
pub fn build_batch_params(bboxes: &[Aabb3D], cell_size: f32) -> Result<(Vec<GridParams>, usize)> {
    let params = bboxes
        .iter()
        .enumerate()
        .map(|(n, bbox)| build_for_element(n, bbox, cell_size))
        .collect::<Result<Vec<_>>>()?;
    let max_total = params.iter().map(|p| p.total).max().unwrap_or(0);
    log::trace!(
        "grid params for {} elements, cell size {cell_size}, max cells {max_total}",
        params.len()
    );
    Ok((params, max_total))
}

/// Bounding box of each element's valid points.
///
/// An element with no valid points gets a degenerate box at the origin.
pub fn bounding_boxes(points: &Batched<Point3>, lengths: &[usize]) -> Result<Vec<Aabb3D>> {
    check_lengths("lengths", lengths, points.batch_len(), points.width())?;
    Ok(points
        .rows()
        .zip(lengths)
        .map(|(row, &len)| {
            Aabb3D::from_points(&row[..len]).unwrap_or(Aabb3D::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0))
        })
        .collect())
}

impl GridParams {
    /// Unclamped floor coordinate of `p` along every axis.
    #[inline]
    pub fn raw_coord(&self, p: Point3) -> [i32; 3] {
        [0, 1, 2].map(|axis| floor_to_i32((p[axis] - self.origin[axis]) * self.inv_cell))
    }

    /// Cell coordinate of a point inside the bounding box.
    ///
    /// A point on the maximum face of an extent that is an exact multiple of the
    /// cell size floors to `res`; it is folded into the last cell so every
    /// enclosed point has a coordinate in `[0, res)`.
    #[inline]
    pub fn cell_coord(&self, p: Point3) -> [i32; 3] {
        let raw = self.raw_coord(p);
        [0, 1, 2].map(|axis| raw[axis].clamp(0, self.res[axis] - 1))
    }

    /// Flat id of an in-range cell coordinate.
    #[inline]
    pub fn cell_id(&self, gc: [i32; 3]) -> usize {
        debug_assert!(
            (0..3).all(|axis| (0..self.res[axis]).contains(&gc[axis])),
            "cell coordinate out of range"
        );
        let flat = (gc[0] * self.res[1] + gc[1]) * self.res[2] + gc[2];
        flat as usize
    }

    /// Flat cell id of a point inside the bounding box.
    #[inline]
    pub fn cell_of(&self, p: Point3) -> usize {
        self.cell_id(self.cell_coord(p))
    }

    /// Whether `p` falls inside the grid, far face included. NaN is never enclosed.
    pub(crate) fn encloses(&self, p: Point3) -> bool {
        (0..3).all(|axis| {
            let scaled = (p[axis] - self.origin[axis]) * self.inv_cell;
            let raw = floor_to_i32(scaled);
            p[axis] >= self.origin[axis]
                && raw >= 0
                && (raw < self.res[axis] || scaled == self.res[axis] as f32)
        })
    }
}
