// Copyright 2025 the FRNN Grid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-shape, batch-major buffers for ragged batches.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{FrnnError, Result};

/// An owned `(N, width)` row-major buffer.
///
/// Each of the `N` rows belongs to one batch element. Ragged batches pad every
/// row to the same `width`; a separate lengths slice says how much of each row
/// is valid.
#[derive(Clone, Debug, PartialEq)]
pub struct Batched<T> {
    data: Vec<T>,
    width: usize,
    batch: usize,
}

impl<T: Clone> Batched<T> {
    /// A `(batch, width)` buffer with every slot set to `value`.
    pub fn filled(batch: usize, width: usize, value: T) -> Self {
        Self {
            data: vec![value; batch * width],
            width,
            batch,
        }
    }
}

impl<T> Batched<T> {
    /// Wrap a flat row-major buffer holding `batch` rows of `width` slots.
    pub fn from_vec(data: Vec<T>, batch: usize, width: usize) -> Result<Self> {
        if data.len() != batch * width {
            return Err(FrnnError::ShapeMismatch {
                what: "flat buffer",
                expected: batch * width,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, batch })
    }

    /// Build from one `Vec` per batch element, padding each row with `pad` up to `width`.
    pub fn from_rows(rows: Vec<Vec<T>>, width: usize, pad: T) -> Result<Self>
    where
        T: Clone,
    {
        let batch = rows.len();
        let mut data = Vec::with_capacity(batch * width);
        for (n, mut row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(FrnnError::LengthExceedsCapacity {
                    batch: n,
                    length: row.len(),
                    capacity: width,
                });
            }
            row.resize(width, pad.clone());
            data.extend(row);
        }
        Ok(Self { data, width, batch })
    }

    /// Number of batch elements `N`.
    pub fn batch_len(&self) -> usize {
        self.batch
    }

    /// Padded row width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Row `n`.
    pub fn row(&self, n: usize) -> &[T] {
        &self.data[n * self.width..(n + 1) * self.width]
    }

    /// Row `n`, mutably.
    pub fn row_mut(&mut self, n: usize) -> &mut [T] {
        &mut self.data[n * self.width..(n + 1) * self.width]
    }

    /// Iterate rows in batch order.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        // `chunks(0)` panics; a zero-width buffer still has `batch` empty rows.
        (0..self.batch).map(move |n| self.row(n))
    }

    /// Mutable rows in batch order. Empty when `width == 0`.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [T]> + '_ {
        self.data.chunks_mut(self.width.max(1))
    }

    /// The flat row-major buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consume into the flat row-major buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

/// Check that `lengths` has one entry per batch element and that none exceeds `capacity`.
pub fn check_lengths(
    what: &'static str,
    lengths: &[usize],
    batch: usize,
    capacity: usize,
) -> Result<()> {
    if lengths.len() != batch {
        return Err(FrnnError::BatchMismatch {
            what,
            expected: batch,
            actual: lengths.len(),
        });
    }
    if let Some((n, &length)) = lengths.iter().enumerate().find(|(_, l)| **l > capacity) {
        return Err(FrnnError::LengthExceedsCapacity {
            batch: n,
            length,
            capacity,
        });
    }
    Ok(())
}

pub(crate) fn check_batch(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(FrnnError::BatchMismatch {
            what,
            expected,
            actual,
        })
    }
}
