// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;

/// A point in 3D, stored as `[x, y, z]`.
pub type Point3 = [f32; 3];

/// Axis-aligned bounding box in 3D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3D {
    /// Minimum x
    pub min_x: f32,
    /// Minimum y
    pub min_y: f32,
    /// Minimum z
    pub min_z: f32,
    /// Maximum x
    pub max_x: f32,
    /// Maximum y
    pub max_y: f32,
    /// Maximum z
    pub max_z: f32,
}

impl Aabb3D {
    /// Create a new AABB from min/max components.
    pub const fn new(min_x: f32, min_y: f32, min_z: f32, max_x: f32, max_y: f32, max_z: f32) -> Self {
        Self {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z,
        }
    }

    /// Create a new AABB from its min and max corners.
    pub const fn from_corners(min: Point3, max: Point3) -> Self {
        Self::new(min[0], min[1], min[2], max[0], max[1], max[2])
    }

    /// The minimum corner.
    pub const fn min(&self) -> Point3 {
        [self.min_x, self.min_y, self.min_z]
    }

    /// The maximum corner.
    pub const fn max(&self) -> Point3 {
        [self.max_x, self.max_y, self.max_z]
    }

    /// Smallest box enclosing every point, or `None` if `points` is empty.
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let seed = Self::from_corners(*first, *first);
        Some(rest.iter().fold(seed, |acc, p| acc.union(&Self::from_corners(*p, *p))))
    }

    /// Whether this AABB contains the point. Both faces are inclusive.
    pub fn contains_point(&self, p: Point3) -> bool {
        let (min, max) = (self.min(), self.max());
        (0..3).all(|axis| le(min[axis], p[axis]) && le(p[axis], max[axis]))
    }

    /// Return true if `max < min` on any axis. NaN components count as inverted.
    pub fn is_inverted(&self) -> bool {
        let (min, max) = (self.min(), self.max());
        (0..3).any(|axis| !le(min[axis], max[axis]))
    }

    /// The union of two AABBs.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: min_t(self.min_x, other.min_x),
            min_y: min_t(self.min_y, other.min_y),
            min_z: min_t(self.min_z, other.min_z),
            max_x: max_t(self.max_x, other.max_x),
            max_y: max_t(self.max_y, other.max_y),
            max_z: max_t(self.max_z, other.max_z),
        }
    }
}

/// Squared Euclidean distance between two points.
#[inline]
pub fn dist_sq(a: Point3, b: Point3) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    dx * dx + dy * dy + dz * dz
}

/// Floor to `i32` without `std` float intrinsics. Saturates outside the `i32` range.
#[inline]
pub fn floor_to_i32(v: f32) -> i32 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Grid coordinates are clamped to the resolution afterwards; saturation is fine."
    )]
    let i = v as i32;
    if (i as f32) > v { i.saturating_sub(1) } else { i }
}

/// Ceil to `i32` without `std` float intrinsics. Saturates outside the `i32` range.
#[inline]
pub fn ceil_to_i32(v: f32) -> i32 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Resolutions are range-checked by the caller."
    )]
    let i = v as i32;
    if (i as f32) < v { i.saturating_add(1) } else { i }
}

/// Total order on `f32` used by the bounded heaps.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct OrdF32(pub(crate) f32);

impl Eq for OrdF32 {}

impl PartialOrd for OrdF32 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF32 {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_and_ceil_match_float_semantics() {
        let cases = [
            (-2.5_f32, -3, -2),
            (-2.0, -2, -2),
            (-0.25, -1, 0),
            (0.0, 0, 0),
            (0.25, 0, 1),
            (1.0, 1, 1),
            (1.75, 1, 2),
        ];
        for (v, floor, ceil) in cases {
            assert_eq!(floor_to_i32(v), floor, "floor({v})");
            assert_eq!(ceil_to_i32(v), ceil, "ceil({v})");
        }
    }

    #[test]
    fn floor_and_ceil_saturate_far_outside_i32() {
        assert_eq!(floor_to_i32(-1.0e10), i32::MIN);
        assert_eq!(ceil_to_i32(-1.0e10), i32::MIN);
        assert_eq!(floor_to_i32(1.0e20), i32::MAX);
        assert_eq!(ceil_to_i32(1.0e20), i32::MAX);
        assert_eq!(floor_to_i32(f32::NEG_INFINITY), i32::MIN);
        assert_eq!(ceil_to_i32(f32::INFINITY), i32::MAX);
    }

    #[test]
    fn from_points_encloses_all() {
        let pts = [[1.0, -2.0, 0.5], [-1.0, 3.0, 0.0], [0.0, 0.0, 4.0]];
        let b = Aabb3D::from_points(&pts).unwrap();
        assert_eq!(b, Aabb3D::new(-1.0, -2.0, 0.0, 1.0, 3.0, 4.0));
        assert!(pts.iter().all(|p| b.contains_point(*p)));
        assert!(Aabb3D::from_points(&[]).is_none());
    }

    #[test]
    fn inverted_and_nan_boxes() {
        assert!(Aabb3D::new(0.0, 0.0, 1.0, 1.0, 1.0, 0.0).is_inverted());
        assert!(Aabb3D::new(f32::NAN, 0.0, 0.0, 1.0, 1.0, 1.0).is_inverted());
        assert!(!Aabb3D::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0).is_inverted());
    }
}
