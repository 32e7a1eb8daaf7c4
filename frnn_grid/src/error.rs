// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invalid-argument errors reported at stage boundaries.

use thiserror::Error;

/// Errors raised when a stage receives inputs of the wrong shape or geometry.
///
/// Every check runs before a stage allocates its outputs, so a failing call
/// never hands back partial results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrnnError {
    /// Two arrays disagree on the batch dimension.
    #[error("batch size mismatch for {what}: expected {expected}, got {actual}")]
    BatchMismatch {
        /// Which input disagreed.
        what: &'static str,
        /// Batch size established by the first input.
        expected: usize,
        /// Batch size found.
        actual: usize,
    },

    /// A flat buffer does not match the declared shape.
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Which buffer disagreed.
        what: &'static str,
        /// Expected element count or width.
        expected: usize,
        /// Actual element count or width.
        actual: usize,
    },

    /// A valid-length value exceeds the padded capacity of its array.
    #[error("length {length} of batch element {batch} exceeds padded capacity {capacity}")]
    LengthExceedsCapacity {
        /// Batch element.
        batch: usize,
        /// Declared valid length.
        length: usize,
        /// Padded width of the array.
        capacity: usize,
    },

    /// Radius was zero, negative, or NaN.
    #[error("radius must be positive, got {0}")]
    NonPositiveRadius(f32),

    /// Cell size was zero, negative, or NaN.
    #[error("cell size must be positive, got {0}")]
    NonPositiveCellSize(f32),

    /// `K` was zero.
    #[error("neighbor count K must be at least 1")]
    ZeroNeighbors,

    /// A bounding box has `max < min` on some axis.
    #[error("bounding box of batch element {batch} is inverted")]
    InvertedBoundingBox {
        /// Batch element.
        batch: usize,
    },

    /// A point passed to insertion lies outside its element's bounding box.
    #[error("point {index} of batch element {batch} lies outside its bounding box")]
    PointOutsideBoundingBox {
        /// Batch element.
        batch: usize,
        /// Point index within the element.
        index: usize,
    },

    /// A point's cell id and rank address a sorted slot outside the valid
    /// prefix, or one already claimed by another point.
    #[error("point {index} of batch element {batch} has an invalid scatter address")]
    InvalidScatterAddress {
        /// Batch element.
        batch: usize,
        /// Point index within the element.
        index: usize,
    },

    /// The grid for a batch element has more cells than an `i32` can address.
    #[error("grid of batch element {batch} is too large; increase the cell size")]
    GridTooLarge {
        /// Batch element.
        batch: usize,
    },
}

/// Result type for grid operations.
pub type Result<T, E = FrnnError> = core::result::Result<T, E>;
