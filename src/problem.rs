//! The quadratic assignment objective.
//!
//! A permutation `p` assigns facility `i` to location `p[i]`. Its cost is
//!
//! ```text
//! cost(p) = sum_{i,j} W[i][j] * D[p[i]][p[j]]
//! ```
//!
//! where `W` is the flow between facilities and `D` the distance between
//! locations.

use crate::error::{QapError, Result};
use crate::matrix::SquareMatrix;

/// A validated QAP instance: flow matrix `W` and distance matrix `D` of equal size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QapProblem {
    w: SquareMatrix,
    d: SquareMatrix,
}

impl QapProblem {
    /// Pairs two matrices into an instance.
    ///
    /// Fails if the sizes differ, the instance is empty, or the worst-case
    /// cost `sum(W) * max(D)` does not fit in `i64`. The last check makes
    /// every cost and swap delta computed later overflow-free.
    pub fn new(w: SquareMatrix, d: SquareMatrix) -> Result<Self> {
        if w.size() != d.size() {
            return Err(QapError::invalid(format!(
                "W is {0}x{0} but D is {1}x{1}",
                w.size(),
                d.size()
            )));
        }
        if w.size() == 0 {
            return Err(QapError::invalid("instance size must be at least 1"));
        }
        w.checked_sum()
            .and_then(|s| s.checked_mul(d.max_entry()))
            .ok_or_else(|| QapError::invalid("matrix magnitudes overflow a 64-bit cost"))?;
        Ok(Self { w, d })
    }

    /// Number of facilities (and locations).
    pub fn size(&self) -> usize {
        self.w.size()
    }

    pub fn weights(&self) -> &SquareMatrix {
        &self.w
    }

    pub fn distances(&self) -> &SquareMatrix {
        &self.d
    }

    /// Full O(n^2) cost of `perm`.
    ///
    /// `perm` must be a permutation of `[0, n)`. Out-of-range indices or a
    /// slice longer than `n` panic.
    pub fn cost(&self, perm: &[usize]) -> i64 {
        debug_assert_eq!(perm.len(), self.size());
        let mut total = 0i64;
        for (i, &pi) in perm.iter().enumerate() {
            let w_row = self.w.row(i);
            let d_row = self.d.row(pi);
            for (j, &pj) in perm.iter().enumerate() {
                total += w_row[j] * d_row[pj];
            }
        }
        total
    }

    /// Cost change from swapping positions `r` and `s` of `perm`, in O(n).
    ///
    /// Equals `cost(swapped) - cost(perm)` for any `W` and `D`, symmetric or not.
    pub fn swap_delta(&self, perm: &[usize], r: usize, s: usize) -> i64 {
        if r == s {
            return 0;
        }
        let (w, d) = (&self.w, &self.d);
        let (pr, ps) = (perm[r], perm[s]);

        let mut delta = w.get(r, r) * (d.get(ps, ps) - d.get(pr, pr))
            + w.get(s, s) * (d.get(pr, pr) - d.get(ps, ps))
            + w.get(r, s) * (d.get(ps, pr) - d.get(pr, ps))
            + w.get(s, r) * (d.get(pr, ps) - d.get(ps, pr));

        for (k, &pk) in perm.iter().enumerate() {
            if k == r || k == s {
                continue;
            }
            delta += (w.get(r, k) - w.get(s, k)) * (d.get(ps, pk) - d.get(pr, pk))
                + (w.get(k, r) - w.get(k, s)) * (d.get(pk, ps) - d.get(pk, pr));
        }
        delta
    }
}
