//! Dense square matrix stored row-major.

use std::ops::Index;

use crate::error::{InvalidProblem, MatrixKind};

/// A dense `n × n` matrix of `f64`, stored row-major in one allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    /// Creates an `n × n` matrix filled with zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// Creates a matrix by evaluating `f(row, col)` for every cell.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(n * n);
        for r in 0..n {
            for c in 0..n {
                data.push(f(r, c));
            }
        }
        Self { n, data }
    }

    /// Builds a matrix from nested rows, checking shape and finiteness.
    ///
    /// `expected` is the dimension every matrix of the problem must share.
    pub(crate) fn from_rows(
        rows: &[Vec<f64>],
        expected: usize,
        kind: MatrixKind,
    ) -> Result<Self, InvalidProblem> {
        if rows.len() != expected {
            return Err(InvalidProblem::DimensionMismatch {
                matrix: kind,
                expected,
                found: rows.len(),
            });
        }
        let mut data = Vec::with_capacity(expected * expected);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(InvalidProblem::NotSquare {
                    matrix: kind,
                    row: r,
                    expected,
                    found: row.len(),
                });
            }
            for (c, &v) in row.iter().enumerate() {
                if !v.is_finite() {
                    return Err(InvalidProblem::NonFinite {
                        matrix: kind,
                        row: r,
                        col: c,
                    });
                }
                data.push(v);
            }
        }
        Ok(Self { n: expected, data })
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n + col]
    }

    /// Borrows one row.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.n..(row + 1) * self.n]
    }

    /// Returns `true` if every entry is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }

    /// Largest off-diagonal entry (0.0 for `n < 2`).
    pub fn max_off_diagonal(&self) -> f64 {
        let mut max = f64::NEG_INFINITY;
        for r in 0..self.n {
            for c in 0..self.n {
                if r != c {
                    max = max.max(self.get(r, c));
                }
            }
        }
        if max.is_finite() {
            max
        } else {
            0.0
        }
    }

    /// Converts back to nested rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.n.max(1)).map(<[f64]>::to_vec).collect()
    }
}

impl Index<(usize, usize)> for SquareMatrix {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * self.n + col]
    }
}
