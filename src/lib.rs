//! Simulated annealing for the quadratic assignment problem (QAP).
//!
//! An instance is a flow matrix `W` and a distance matrix `D`, both
//! `n x n`. A solution is a permutation `p` of `[0, n)` assigning facility
//! `i` to location `p[i]`, and its cost is
//! `sum_{i,j} W[i][j] * D[p[i]][p[j]]`.
//!
//! - [`sa`]: the annealing engine, its configuration and run results.
//! - [`problem`]: cost evaluation, including O(n) swap deltas.
//! - [`permutation`]: random permutations and transposition moves.
//! - [`qaplib`]: reader for QAPLIB instance and solution files.
//! - [`trials`]: optimality-gap statistics over repeated runs.
//!
//! # Example
//!
//! ```
//! use qap_anneal::sa::AnnealingEngine;
//!
//! let w = vec![vec![0, 1], vec![1, 0]];
//! let d = vec![vec![0, 2], vec![2, 0]];
//! let engine = AnnealingEngine::new(w, d, 0.9, 0.1, 10.0).unwrap();
//! let result = engine.solve_seeded(10, 7).unwrap();
//! assert_eq!(result.best_cost, 4);
//! ```

pub mod error;
pub mod matrix;
pub mod permutation;
pub mod problem;
pub mod qaplib;
pub mod sa;
pub mod trials;

pub use error::{QapError, Result};
