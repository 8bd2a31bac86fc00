//! Precomputed pairwise similarity between catalog rows.
//!
//! The matrix is produced outside this system. We only validate its shape
//! and values when it is loaded and then hand out read-only rows.

use crate::error::{DataLoadError, Result};
use crate::types::RowId;
use rayon::prelude::*;

/// Square matrix of similarity values, stored row-major.
///
/// Entry `(i, j)` is the similarity of row `i` to row `j`; it need not be
/// symmetric. Every value is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dimension: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build from a flat row-major buffer of `dimension * dimension` values
    pub fn from_flat(dimension: usize, mut values: Vec<f32>) -> Result<Self> {
        let expected = dimension.checked_mul(dimension).ok_or_else(|| {
            DataLoadError::InvalidValue {
                field: "dimension".to_string(),
                value: dimension.to_string(),
            }
        })?;
        if values.len() != expected {
            return Err(DataLoadError::DimensionMismatch {
                expected,
                found: values.len(),
                context: format!("flat buffer for a {dimension}x{dimension} matrix"),
            });
        }

        if let Some(position) = values.par_iter().position_any(|v| !v.is_finite()) {
            return Err(DataLoadError::InvalidValue {
                field: format!("similarity[{}][{}]", position / dimension, position % dimension),
                value: values[position].to_string(),
            });
        }

        // -0.0 must rank level with 0.0 under total_cmp
        values.par_iter_mut().for_each(|v| {
            if *v == 0.0 {
                *v = 0.0;
            }
        });

        Ok(Self { dimension, values })
    }

    /// Build from nested rows, checking that the matrix is square
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dimension) {
            return Err(DataLoadError::DimensionMismatch {
                expected: dimension,
                found: row.len(),
                context: format!("length of row {i}"),
            });
        }
        let values = rows.into_iter().flatten().collect();
        Self::from_flat(dimension, values)
    }

    /// Number of rows (and columns)
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Similarity of `row` to every row, including itself.
    ///
    /// Returns `None` for an out-of-range row.
    pub fn row(&self, row: RowId) -> Option<&[f32]> {
        if row >= self.dimension {
            return None;
        }
        let start = row * self.dimension;
        Some(&self.values[start..start + self.dimension])
    }

    /// Single entry lookup
    pub fn get(&self, from: RowId, to: RowId) -> Option<f32> {
        self.row(from).and_then(|r| r.get(to).copied())
    }

    /// Check that this matrix addresses exactly `rows` catalog rows
    pub fn ensure_aligned(&self, rows: usize) -> Result<()> {
        if self.dimension != rows {
            return Err(DataLoadError::DimensionMismatch {
                expected: rows,
                found: self.dimension,
                context: "matrix dimension vs catalog size".to_string(),
            });
        }
        Ok(())
    }
}
