// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gather neighbor coordinates from search results.

use crate::batch::{Batched, check_batch};
use crate::error::{FrnnError, Result};
use crate::query::{NO_NEIGHBOR, Neighbors};
use crate::types::Point3;

/// Reference coordinates of every result slot, shaped `(N, P1 * K)`.
///
/// Row `n` holds query `p`'s neighbors at `p * K .. (p + 1) * K`. Sentinel
/// slots are filled with the origin.
pub fn gather_neighbors(reference: &Batched<Point3>, neighbors: &Neighbors) -> Result<Batched<Point3>> {
    check_batch("reference points", neighbors.batch_len(), reference.batch_len())?;
    let width = neighbors.queries() * neighbors.k();
    if let Some(&bad) = neighbors
        .idxs_flat()
        .iter()
        .find(|&&i| {
            i != NO_NEIGHBOR && usize::try_from(i).ok().is_none_or(|i| i >= reference.width())
        })
    {
        return Err(FrnnError::ShapeMismatch {
            what: "neighbor index",
            expected: reference.width(),
            actual: usize::try_from(bad).unwrap_or(usize::MAX),
        });
    }

    let mut out = Batched::filled(neighbors.batch_len(), width, [0.0; 3]);
    for (n, row) in out.rows_mut().enumerate() {
        let src = reference.row(n);
        let idxs = &neighbors.idxs_flat()[n * width..(n + 1) * width];
        for (slot, &i) in row.iter_mut().zip(idxs) {
            if let Ok(i) = usize::try_from(i) {
                *slot = src[i];
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::frnn_grid_points;
    use crate::types::Aabb3D;
    use alloc::vec;

    #[test]
    fn gathers_coordinates_and_zero_fills_sentinels() {
        let reference = Batched::from_rows(
            vec![vec![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [2.0, 0.0, 0.0]]],
            3,
            [0.0; 3],
        )
        .unwrap();
        let query = Batched::from_rows(vec![vec![[2.0, 0.0, 0.0]]], 1, [0.0; 3]).unwrap();
        let bboxes = [Aabb3D::new(0.0, 0.0, 0.0, 2.0, 0.0, 0.0)];
        let nb = frnn_grid_points(&bboxes, &query, &reference, &[1], &[3], 2, 1.0).unwrap();
        let nn = gather_neighbors(&reference, &nb).unwrap();
        assert_eq!(nn.width(), 2);
        assert_eq!(nn.row(0), &[[2.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
    }

    #[test]
    fn rejects_mismatched_references() {
        let reference = Batched::filled(1, 2, [0.0_f32; 3]);
        let mut nb = Neighbors::new(1, 1, 1);
        assert!(gather_neighbors(&reference, &nb).is_ok());

        let other = Batched::filled(2, 2, [0.0_f32; 3]);
        assert!(matches!(
            gather_neighbors(&other, &nb),
            Err(FrnnError::BatchMismatch { .. })
        ));

        nb.slots_mut().0[0] = 5;
        assert!(matches!(
            gather_neighbors(&reference, &nb),
            Err(FrnnError::ShapeMismatch {
                what: "neighbor index",
                ..
            })
        ));
    }
}
