//! Reader for QAPLIB instance (`.dat`) and solution (`.sln`) files.
//!
//! Both formats are whitespace-separated integers. An instance is `n`
//! followed by the `n x n` flow matrix and then the `n x n` distance
//! matrix. A solution is `n`, the optimal cost, and optionally the
//! optimal assignment as 1-based location indices.

use crate::error::{QapError, Result};
use crate::matrix::SquareMatrix;
use crate::permutation::is_permutation;
use crate::problem::QapProblem;
use std::path::Path;

/// A known solution for a QAPLIB instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaplibSolution {
    pub size: usize,
    pub cost: i64,
    /// Zero-based assignment, if the file lists one.
    pub permutation: Option<Vec<usize>>,
}

fn integers(text: &str) -> Result<Vec<i64>> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<i64>()
                .map_err(|_| QapError::Parse(format!("not an integer: {tok:?}")))
        })
        .collect()
}

fn read_size(values: &[i64]) -> Result<usize> {
    let first = *values.first().ok_or_else(|| QapError::Parse("empty input".into()))?;
    usize::try_from(first).map_err(|_| QapError::Parse(format!("invalid size {first}")))
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| QapError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses instance text into a [`QapProblem`].
pub fn parse_instance(text: &str) -> Result<QapProblem> {
    let values = integers(text)?;
    let n = read_size(&values)?;
    let cells = n
        .checked_mul(n)
        .filter(|c| c.checked_mul(2).is_some())
        .ok_or_else(|| QapError::Parse(format!("size {n} too large")))?;
    let body = &values[1..];
    if body.len() != 2 * cells {
        return Err(QapError::Parse(format!(
            "expected {} matrix entries for n = {n}, found {}",
            2 * cells,
            body.len()
        )));
    }
    let w = SquareMatrix::from_flat(n, body[..cells].to_vec())?;
    let d = SquareMatrix::from_flat(n, body[cells..].to_vec())?;
    QapProblem::new(w, d)
}

/// Parses solution text.
pub fn parse_solution(text: &str) -> Result<QaplibSolution> {
    let values = integers(text)?;
    let size = read_size(&values)?;
    let cost = *values
        .get(1)
        .ok_or_else(|| QapError::Parse("missing solution cost".into()))?;

    let rest = &values[2..];
    let permutation = if rest.is_empty() {
        None
    } else {
        if rest.len() != size {
            return Err(QapError::Parse(format!(
                "expected {size} assignment entries, found {}",
                rest.len()
            )));
        }
        let perm: Vec<usize> = rest
            .iter()
            .map(|&v| {
                usize::try_from(v)
                    .ok()
                    .and_then(|v| v.checked_sub(1))
                    .unwrap_or(usize::MAX)
            })
            .collect();
        if !is_permutation(&perm) {
            return Err(QapError::Parse("assignment is not a permutation of 1..=n".into()));
        }
        Some(perm)
    };

    Ok(QaplibSolution {
        size,
        cost,
        permutation,
    })
}

/// Reads and parses an instance file.
pub fn read_instance(path: impl AsRef<Path>) -> Result<QapProblem> {
    let path = path.as_ref();
    log::debug!("reading QAPLIB instance {}", path.display());
    parse_instance(&read_file(path)?)
}

/// Reads and parses a solution file.
pub fn read_solution(path: impl AsRef<Path>) -> Result<QaplibSolution> {
    parse_solution(&read_file(path.as_ref())?)
}
