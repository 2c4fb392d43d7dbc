//! Ensemble matrix: one row per case, one column per ensemble member.

use crate::error::{DressingError, Result};

/// Layout of nested input values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueLayout {
    /// Each inner vector is a case across all members (row-major).
    #[default]
    Row,
    /// Each inner vector is one member across all cases (column-major).
    Column,
}

/// Rectangular `n_samples × n_members` matrix of member predictions.
///
/// Stored row-major. Column `j` refers to the same ensemble member in every
/// row, and across `fit` and `predict` calls.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnsembleMatrix {
    data: Vec<f64>,
    n_samples: usize,
    n_members: usize,
}

impl EnsembleMatrix {
    /// Create a matrix from nested vectors in the given layout.
    ///
    /// Every inner vector must have the same length.
    pub fn new(values: Vec<Vec<f64>>, layout: ValueLayout) -> Result<Self> {
        let outer = values.len();
        let inner = values.first().map(|v| v.len()).unwrap_or(0);

        for v in &values {
            if v.len() != inner {
                return Err(match layout {
                    ValueLayout::Row => DressingError::DimensionMismatch {
                        expected: inner,
                        got: v.len(),
                    },
                    ValueLayout::Column => DressingError::ShapeMismatch {
                        expected: inner,
                        got: v.len(),
                    },
                });
            }
        }

        match layout {
            ValueLayout::Row => {
                let data = values.into_iter().flatten().collect();
                Self::from_row_major(outer, inner, data)
            }
            ValueLayout::Column => {
                let mut data = Vec::with_capacity(outer * inner);
                for i in 0..inner {
                    data.extend(values.iter().map(|column| column[i]));
                }
                Self::from_row_major(inner, outer, data)
            }
        }
    }

    /// Create a matrix from rows (one case per row).
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(rows, ValueLayout::Row)
    }

    /// Create a matrix from columns (one member per column).
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(columns, ValueLayout::Column)
    }

    /// Create a matrix from a flat row-major buffer.
    pub fn from_row_major(n_samples: usize, n_members: usize, data: Vec<f64>) -> Result<Self> {
        if n_samples > 0 && n_members == 0 {
            return Err(DressingError::InvalidParameter(
                "each case must contain at least one member prediction".to_string(),
            ));
        }
        if data.len() != n_samples * n_members {
            return Err(DressingError::DimensionMismatch {
                expected: n_samples * n_members,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            n_samples,
            n_members,
        })
    }

    /// Number of cases (rows).
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of ensemble members (columns).
    pub fn n_members(&self) -> usize {
        self.n_members
    }

    /// `(n_samples, n_members)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_samples, self.n_members)
    }

    /// Check if the matrix holds no cases.
    pub fn is_empty(&self) -> bool {
        self.n_samples == 0
    }

    /// Value of member `member` for case `sample`.
    pub fn get(&self, sample: usize, member: usize) -> Option<f64> {
        if sample < self.n_samples && member < self.n_members {
            Some(self.data[sample * self.n_members + member])
        } else {
            None
        }
    }

    /// Member predictions for one case.
    ///
    /// # Panics
    /// Panics if `sample >= n_samples()`.
    pub fn row(&self, sample: usize) -> &[f64] {
        let start = sample * self.n_members;
        &self.data[start..start + self.n_members]
    }

    /// Iterate over cases.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_members.max(1))
    }

    /// Iterate over one member's predictions across all cases.
    pub fn column(&self, member: usize) -> impl Iterator<Item = f64> + '_ {
        let step = self.n_members.max(1);
        let start = if member < self.n_members {
            member
        } else {
            self.data.len()
        };
        self.data.iter().skip(start).step_by(step).copied()
    }

    /// Collect one member's predictions into a vector.
    pub fn column_vec(&self, member: usize) -> Vec<f64> {
        self.column(member).collect()
    }

    /// Flat row-major view of the data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Apply `f(member, value)` to every element, keeping the shape.
    pub fn map_members<F>(&self, f: F) -> Self
    where
        F: Fn(usize, f64) -> f64,
    {
        let step = self.n_members.max(1);
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(idx, &v)| f(idx % step, v))
            .collect();
        Self {
            data,
            n_samples: self.n_samples,
            n_members: self.n_members,
        }
    }

    /// Column-wise arithmetic mean.
    pub fn column_means(&self) -> Vec<f64> {
        if self.n_samples == 0 {
            return vec![f64::NAN; self.n_members];
        }
        let mut sums = vec![0.0; self.n_members];
        for row in self.rows() {
            for (s, v) in sums.iter_mut().zip(row) {
                *s += v;
            }
        }
        let n = self.n_samples as f64;
        sums.into_iter().map(|s| s / n).collect()
    }
}
