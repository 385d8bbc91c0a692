//! Simulated Annealing (SA) over permutations.
//!
//! A single-solution trajectory metaheuristic inspired by the physical
//! annealing process. Each temperature level proposes a fixed number of
//! random transpositions of the current assignment; improving moves and
//! ties are always taken, worsening moves with probability `exp(-delta / T)`.
//! Temperature then decays geometrically until it reaches `Tmin`.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Burkard & Rendl (1984), "A thermodynamically motivated simulation procedure
//!   for combinatorial optimization problems"

mod config;
mod runner;

pub use config::AnnealConfig;
pub use runner::{AnnealResult, AnnealingEngine};
