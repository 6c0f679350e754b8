//! Dense pairwise distance matrix.
//!
//! Distances are whole metres stored row-major in a single buffer.
//! `matrix.get(i, j)` is the distance from waypoint `i` to waypoint `j`; the
//! matrix need not be symmetric.

use thiserror::Error;

/// Distance recorded for pairs the service could not measure.
///
/// Failed lookups and genuinely unreachable pairs share this value. It is a
/// large finite cost rather than an error so the solver can still rank tours
/// that must cross such a leg.
pub const UNREACHABLE: u32 = 999_999;

/// Errors returned when constructing a [`DistanceMatrix`] from rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceMatrixError {
    /// No rows were supplied.
    #[error("distance matrix must contain at least one row")]
    Empty,
    /// A row had a different length from the row count.
    #[error("row {row} has {len} columns, expected {expected}")]
    NotSquare {
        /// Index of the offending row.
        row: usize,
        /// Number of columns found.
        len: usize,
        /// Number of columns required.
        expected: usize,
    },
}

/// Square matrix of distances in metres.
///
/// # Examples
/// ```
/// use tourwise_core::{DistanceMatrix, UNREACHABLE};
///
/// # fn main() -> Result<(), tourwise_core::DistanceMatrixError> {
/// let matrix = DistanceMatrix::from_rows(vec![vec![0, 100], vec![120, 0]])?;
/// assert_eq!(matrix.get(1, 0), Some(120));
///
/// let blank = DistanceMatrix::unreachable(2);
/// assert_eq!(blank.get(0, 1), Some(UNREACHABLE));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DistanceMatrix {
    size: usize,
    cells: Vec<u32>,
}

impl DistanceMatrix {
    /// Create a `size × size` matrix with every cell set to [`UNREACHABLE`].
    #[must_use]
    pub fn unreachable(size: usize) -> Self {
        Self {
            size,
            cells: vec![UNREACHABLE; size.saturating_mul(size)],
        }
    }

    /// Build a matrix from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceMatrixError::Empty`] for no rows and
    /// [`DistanceMatrixError::NotSquare`] when any row length differs from the
    /// number of rows.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self, DistanceMatrixError> {
        let size = rows.len();
        if size == 0 {
            return Err(DistanceMatrixError::Empty);
        }
        let mut cells = Vec::with_capacity(size.saturating_mul(size));
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(DistanceMatrixError::NotSquare {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            cells.extend(values);
        }
        Ok(Self { size, cells })
    }

    /// Number of waypoints covered by the matrix.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Distance from `from` to `to`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, from: usize, to: usize) -> Option<u32> {
        self.index(from, to).and_then(|idx| self.cells.get(idx)).copied()
    }

    /// Overwrite a single cell. Returns `false` when out of range.
    pub fn set(&mut self, from: usize, to: usize, meters: u32) -> bool {
        match self.index(from, to).and_then(|idx| self.cells.get_mut(idx)) {
            Some(cell) => {
                *cell = meters;
                true
            }
            None => false,
        }
    }

    /// Borrow row `from` as a slice.
    #[must_use]
    pub fn row(&self, from: usize) -> Option<&[u32]> {
        let start = from.checked_mul(self.size)?;
        self.cells.get(start..start.checked_add(self.size)?)
    }

    /// Mutably borrow row `from` as a slice.
    pub fn row_mut(&mut self, from: usize) -> Option<&mut [u32]> {
        let start = from.checked_mul(self.size)?;
        let end = start.checked_add(self.size)?;
        self.cells.get_mut(start..end)
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks(self.size.max(1))
    }

    /// Copy the matrix into nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.rows().map(<[u32]>::to_vec).collect()
    }

    /// Number of off-diagonal cells holding [`UNREACHABLE`].
    #[must_use]
    pub fn unreachable_cells(&self) -> usize {
        self.rows()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|&(j, &cell)| i != j && cell == UNREACHABLE)
                    .count()
            })
            .sum()
    }

    fn index(&self, from: usize, to: usize) -> Option<usize> {
        if from >= self.size || to >= self.size {
            return None;
        }
        from.checked_mul(self.size)?.checked_add(to)
    }
}
