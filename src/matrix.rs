//! Square integer matrices for flow and distance data.

use crate::error::{QapError, Result};

/// A validated `n x n` matrix of non-negative integers, stored row-major.
///
/// # Examples
///
/// ```
/// use qap_anneal::matrix::SquareMatrix;
///
/// let m = SquareMatrix::from_rows(vec![vec![0, 2], vec![3, 0]]).unwrap();
/// assert_eq!(m.size(), 2);
/// assert_eq!(m.get(1, 0), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SquareMatrix {
    n: usize,
    data: Vec<i64>,
}

impl SquareMatrix {
    /// Builds a matrix from nested rows.
    ///
    /// Fails if the rows are ragged, the matrix is not square, or any
    /// entry is negative.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(QapError::invalid(format!(
                    "row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Self::from_flat(n, data)
    }

    /// Builds a matrix from `n * n` row-major values.
    pub fn from_flat(n: usize, data: Vec<i64>) -> Result<Self> {
        let cells = n
            .checked_mul(n)
            .ok_or_else(|| QapError::invalid(format!("matrix size {n} too large")))?;
        if data.len() != cells {
            return Err(QapError::invalid(format!(
                "expected {cells} entries for a {n}x{n} matrix, got {}",
                data.len()
            )));
        }
        if let Some(pos) = data.iter().position(|&v| v < 0) {
            return Err(QapError::invalid(format!(
                "negative entry {} at ({}, {})",
                data[pos],
                pos / n,
                pos % n
            )));
        }
        Ok(Self { n, data })
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> i64 {
        self.data[i * self.n + j]
    }

    /// Row `i` as a slice.
    #[inline]
    pub fn row(&self, i: usize) -> &[i64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Largest entry, or 0 for an empty matrix.
    pub fn max_entry(&self) -> i64 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all entries, `None` on `i64` overflow.
    pub fn checked_sum(&self) -> Option<i64> {
        self.data.iter().try_fold(0i64, |acc, &v| acc.checked_add(v))
    }
}
