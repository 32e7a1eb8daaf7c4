// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Search configuration.

use alloc::vec::Vec;

use crate::error::{FrnnError, Result};
use crate::query::check_query_args;
use crate::types::Aabb3D;

/// Where each batch element's bounding box comes from.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum BoxSource {
    /// Derive each box from the element's valid reference points.
    #[default]
    FromPoints,
    /// Caller-supplied boxes, one per batch element. They must enclose every
    /// valid reference point.
    Explicit(Vec<Aabb3D>),
}

/// Parameters of a fixed-radius nearest-neighbor search.
///
/// ```rust
/// use frnn_grid::FrnnOptions;
///
/// let opts = FrnnOptions::new(8, 0.1).with_radius_cell_ratio(2.0);
/// assert_eq!(opts.cell_size(), 0.05);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FrnnOptions {
    /// Maximum neighbors returned per query point.
    pub k: usize,
    /// Search radius (inclusive).
    pub radius: f32,
    /// Cells per radius; the cell size is `radius / radius_cell_ratio`.
    pub radius_cell_ratio: f32,
    /// Bounding box source.
    pub bboxes: BoxSource,
}

impl FrnnOptions {
    /// `k` neighbors within `radius`, one cell per radius, boxes from the points.
    pub fn new(k: usize, radius: f32) -> Self {
        Self {
            k,
            radius,
            radius_cell_ratio: 1.0,
            bboxes: BoxSource::FromPoints,
        }
    }

    /// Use `ratio` cells per radius. Larger ratios mean smaller cells and
    /// tighter candidate sets at the cost of more cells per query.
    pub fn with_radius_cell_ratio(mut self, ratio: f32) -> Self {
        self.radius_cell_ratio = ratio;
        self
    }

    /// Use caller-supplied bounding boxes.
    pub fn with_bboxes(mut self, bboxes: Vec<Aabb3D>) -> Self {
        self.bboxes = BoxSource::Explicit(bboxes);
        self
    }

    /// Grid cell side length.
    pub fn cell_size(&self) -> f32 {
        self.radius / self.radius_cell_ratio
    }

    /// Check `k`, the radius, and the resulting cell size.
    pub fn validate(&self) -> Result<()> {
        check_query_args(self.k, self.radius)?;
        let cell = self.cell_size();
        if !(cell > 0.0) || cell.is_infinite() {
            return Err(FrnnError::NonPositiveCellSize(cell));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_one_cell_per_radius() {
        let o = FrnnOptions::new(4, 0.5);
        assert_eq!(o.cell_size(), 0.5);
        assert_eq!(o.bboxes, BoxSource::FromPoints);
        assert!(o.validate().is_ok());
    }

    #[test]
    fn invalid_options_are_rejected() {
        assert_eq!(FrnnOptions::new(0, 1.0).validate(), Err(FrnnError::ZeroNeighbors));
        assert_eq!(
            FrnnOptions::new(1, -1.0).validate(),
            Err(FrnnError::NonPositiveRadius(-1.0))
        );
        assert!(matches!(
            FrnnOptions::new(1, 1.0).with_radius_cell_ratio(0.0).validate(),
            Err(FrnnError::NonPositiveCellSize(_))
        ));
        assert!(matches!(
            FrnnOptions::new(1, 1.0).with_radius_cell_ratio(-2.0).validate(),
            Err(FrnnError::NonPositiveCellSize(_))
        ));
    }
}
