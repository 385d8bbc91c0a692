//! SA execution loop.

use super::config::AnnealConfig;
use crate::error::{QapError, Result};
use crate::matrix::SquareMatrix;
use crate::permutation::{random_permutation, random_transposition, transposition_neighbor};
use crate::problem::QapProblem;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of a simulated annealing run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealResult {
    /// The best permutation found over the whole trajectory.
    pub best: Vec<usize>,

    /// Cost of the best permutation.
    pub best_cost: i64,

    /// Cost of the random starting permutation.
    pub initial_cost: i64,

    /// Total number of neighbor proposals evaluated.
    pub iterations: usize,

    /// Number of temperature levels completed.
    pub temperature_levels: usize,

    /// Temperature when the algorithm stopped.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements and ties).
    pub accepted_moves: usize,

    /// Number of strictly improving moves.
    pub improving_moves: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,
}

/// Simulated annealing over permutations for a single QAP instance.
///
/// The instance and hyperparameters are fixed at construction. Every call
/// to [`solve`](Self::solve) is an independent run with its own search state.
///
/// # Examples
///
/// ```
/// use qap_anneal::sa::AnnealingEngine;
///
/// let w = vec![vec![0, 3, 2], vec![1, 0, 3], vec![4, 6, 0]];
/// let d = vec![vec![0, 2, 3], vec![2, 0, 4], vec![5, 1, 0]];
/// let engine = AnnealingEngine::new(w, d, 0.9, 0.01, 50.0).unwrap();
///
/// let result = engine.solve_seeded(100, 42).unwrap();
/// assert_eq!(result.best.len(), 3);
/// assert_eq!(engine.cost(&result.best), result.best_cost);
/// ```
#[derive(Debug, Clone)]
pub struct AnnealingEngine {
    problem: QapProblem,
    config: AnnealConfig,
}

impl AnnealingEngine {
    /// Builds an engine from raw matrices and the hyperparameters `rate`,
    /// `t_min` and `t0`.
    pub fn new(w: Vec<Vec<i64>>, d: Vec<Vec<i64>>, rate: f64, t_min: f64, t0: f64) -> Result<Self> {
        let problem = QapProblem::new(SquareMatrix::from_rows(w)?, SquareMatrix::from_rows(d)?)?;
        Self::with_config(problem, AnnealConfig::new(rate, t_min, t0))
    }

    /// Builds an engine from an already validated instance.
    pub fn with_config(problem: QapProblem, config: AnnealConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { problem, config })
    }

    pub fn problem(&self) -> &QapProblem {
        &self.problem
    }

    pub fn config(&self) -> &AnnealConfig {
        &self.config
    }

    /// Number of facilities.
    pub fn size(&self) -> usize {
        self.problem.size()
    }

    /// Assignment cost `sum_{i,j} W[i][j] * D[perm[i]][perm[j]]`.
    ///
    /// `perm` must be a permutation of `[0, n)`.
    ///
    /// # Panics
    ///
    /// Panics if `perm` is longer than `n` or holds an index `>= n`. A
    /// shorter slice is not detected in release builds and yields a partial sum.
    pub fn cost(&self, perm: &[usize]) -> i64 {
        self.problem.cost(perm)
    }

    /// A uniformly random permutation of `[0, n)`.
    pub fn generate_init_soln<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        random_permutation(self.size(), rng)
    }

    /// A copy of `perm` with two distinct random positions swapped.
    pub fn generate_neighbor<R: Rng>(&self, perm: &[usize], rng: &mut R) -> Vec<usize> {
        transposition_neighbor(perm, rng)
    }

    /// Runs one anneal, seeding from the configured seed or OS entropy.
    pub fn solve(&self, n_iters: usize) -> Result<AnnealResult> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.solve_with_rng(n_iters, &mut rng)
    }

    /// Runs one anneal with a fixed seed, ignoring the configured one.
    pub fn solve_seeded(&self, n_iters: usize, seed: u64) -> Result<AnnealResult> {
        self.solve_with_rng(n_iters, &mut StdRng::seed_from_u64(seed))
    }

    /// Runs one anneal drawing all randomness from `rng`.
    pub fn solve_with_rng<R: Rng>(&self, n_iters: usize, rng: &mut R) -> Result<AnnealResult> {
        self.solve_with_cancel(n_iters, rng, None)
    }

    /// Runs one anneal with an optional cancellation token.
    ///
    /// The token is polled once per temperature level.
    pub fn solve_with_cancel<R: Rng>(
        &self,
        n_iters: usize,
        rng: &mut R,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AnnealResult> {
        if n_iters == 0 {
            return Err(QapError::invalid("n_iters must be positive"));
        }
        let n = self.size();
        log::debug!(
            "annealing n={n}: T0={}, Tmin={}, rate={}, {n_iters} proposals per level",
            self.config.initial_temperature,
            self.config.min_temperature,
            self.config.cooling_rate
        );

        // Initialize
        let mut current = self.generate_init_soln(rng);
        let mut current_cost = self.problem.cost(&current);
        let initial_cost = current_cost;
        let mut best = current.clone();
        let mut best_cost = current_cost;

        let mut temperature = self.config.initial_temperature;
        let mut total_iterations = 0usize;
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut levels = 0usize;
        let mut cancelled = false;

        while temperature > self.config.min_temperature {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            for _ in 0..n_iters {
                total_iterations += 1;
                let Some((r, s)) = random_transposition(n, rng) else {
                    continue;
                };
                let delta = self.problem.swap_delta(&current, r, s);

                // Metropolis acceptance criterion
                let accept = if delta <= 0 {
                    if delta < 0 {
                        improving_moves += 1;
                    }
                    true
                } else {
                    let probability = (-(delta as f64) / temperature).exp();
                    rng.random_range(0.0..1.0) < probability
                };

                if accept {
                    current.swap(r, s);
                    current_cost += delta;
                    accepted_moves += 1;

                    if current_cost < best_cost {
                        best.copy_from_slice(&current);
                        best_cost = current_cost;
                    }
                }
            }

            log::trace!("level {levels}: T={temperature:.6}, current={current_cost}, best={best_cost}");

            // Cool down
            let next = self.config.cool(temperature);
            levels += 1;
            if next >= temperature {
                log::warn!("temperature stalled at {temperature}; stopping");
                break;
            }
            temperature = next;
        }

        debug_assert_eq!(self.problem.cost(&best), best_cost);
        log::debug!(
            "annealing finished after {levels} levels ({total_iterations} proposals): best={best_cost}, initial={initial_cost}{}",
            if cancelled { ", cancelled" } else { "" }
        );

        Ok(AnnealResult {
            best,
            best_cost,
            initial_cost,
            iterations: total_iterations,
            temperature_levels: levels,
            final_temperature: temperature,
            accepted_moves,
            improving_moves,
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation::is_permutation;

    fn chr_like() -> (Vec<Vec<i64>>, Vec<Vec<i64>>) {
        let w = vec![
            vec![0, 5, 2, 4, 1],
            vec![5, 0, 3, 0, 2],
            vec![2, 3, 0, 0, 0],
            vec![4, 0, 0, 0, 5],
            vec![1, 2, 0, 5, 0],
        ];
        let d = vec![
            vec![0, 1, 1, 2, 3],
            vec![1, 0, 2, 1, 2],
            vec![1, 2, 0, 1, 2],
            vec![2, 1, 1, 0, 1],
            vec![3, 2, 2, 1, 0],
        ];
        (w, d)
    }

    fn brute_force_optimum(engine: &AnnealingEngine) -> i64 {
        fn rec(engine: &AnnealingEngine, perm: &mut Vec<usize>, k: usize, best: &mut i64) {
            if k == perm.len() {
                *best = (*best).min(engine.cost(perm));
                return;
            }
            for i in k..perm.len() {
                perm.swap(k, i);
                rec(engine, perm, k + 1, best);
                perm.swap(k, i);
            }
        }
        let mut perm: Vec<usize> = (0..engine.size()).collect();
        let mut best = i64::MAX;
        rec(engine, &mut perm, 0, &mut best);
        best
    }

    #[test]
    fn test_construction_errors() {
        let (w, d) = chr_like();
        assert!(AnnealingEngine::new(w.clone(), d.clone(), 0.9, 0.01, 10.0).is_ok());
        assert!(AnnealingEngine::new(w.clone(), vec![vec![0]], 0.9, 0.01, 10.0).is_err());
        assert!(AnnealingEngine::new(vec![], vec![], 0.9, 0.01, 10.0).is_err());
        assert!(AnnealingEngine::new(w.clone(), d.clone(), 0.9, 10.0, 10.0).is_err());
        assert!(AnnealingEngine::new(w.clone(), d.clone(), 0.9, 0.0, 10.0).is_err());
        assert!(AnnealingEngine::new(w.clone(), d.clone(), 1.0, 0.01, 10.0).is_err());
        assert!(AnnealingEngine::new(w, d, 0.0, 0.01, 10.0).is_err());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let (w, d) = chr_like();
        let engine = AnnealingEngine::new(w, d, 0.9, 0.01, 10.0).unwrap();
        let err = engine.solve_seeded(0, 1).unwrap_err();
        assert!(matches!(err, QapError::InvalidInput(_)));
    }

    #[test]
    fn test_finds_optimum_small_instance() {
        let (w, d) = chr_like();
        let engine = AnnealingEngine::new(w, d, 0.95, 0.01, 50.0).unwrap();
        let optimum = brute_force_optimum(&engine);

        let result = engine.solve_seeded(200, 42).unwrap();

        assert!(is_permutation(&result.best));
        assert_eq!(engine.cost(&result.best), result.best_cost);
        assert_eq!(result.best_cost, optimum, "expected optimum {optimum}, got {}", result.best_cost);
    }

    #[test]
    fn test_best_not_worse_than_initial() {
        let (w, d) = chr_like();
        let engine = AnnealingEngine::new(w, d, 0.8, 0.1, 20.0).unwrap();
        for seed in 0..20 {
            let result = engine.solve_seeded(10, seed).unwrap();
            assert!(result.best_cost <= result.initial_cost);
        }
    }

    #[test]
    fn test_two_facility_symmetric_case() {
        let engine = AnnealingEngine::new(
            vec![vec![0, 1], vec![1, 0]],
            vec![vec![0, 2], vec![2, 0]],
            0.5,
            0.1,
            1.0,
        )
        .unwrap();
        for seed in 0..5 {
            assert_eq!(engine.solve_seeded(3, seed).unwrap().best_cost, 4);
        }
    }

    #[test]
    fn test_single_facility() {
        let engine = AnnealingEngine::new(vec![vec![3]], vec![vec![7]], 0.5, 0.1, 1.0).unwrap();
        let result = engine.solve_seeded(4, 0).unwrap();
        assert_eq!(result.best, vec![0]);
        assert_eq!(result.best_cost, 21);
        assert_eq!(result.accepted_moves, 0);
    }

    #[test]
    fn test_terminates_within_level_bound() {
        let (w, d) = chr_like();
        let engine = AnnealingEngine::new(w, d, 0.9, 1.0, 100.0).unwrap();
        let result = engine.solve_seeded(5, 9).unwrap();
        assert_eq!(result.temperature_levels, engine.config().temperature_levels());
        assert_eq!(result.iterations, 5 * result.temperature_levels);
        assert!(result.final_temperature <= 1.0);
    }

    #[test]
    fn test_subnormal_temperatures_rejected() {
        let err = AnnealingEngine::new(
            vec![vec![0, 1], vec![1, 0]],
            vec![vec![0, 2], vec![2, 0]],
            0.75,
            5e-324,
            1e-323,
        )
        .unwrap_err();
        assert!(matches!(err, QapError::InvalidInput(_)));
    }

    #[test]
    fn test_terminates_near_smallest_normal_temperature() {
        let engine = AnnealingEngine::new(
            vec![vec![0, 1], vec![1, 0]],
            vec![vec![0, 2], vec![2, 0]],
            0.5,
            f64::MIN_POSITIVE,
            4.0 * f64::MIN_POSITIVE,
        )
        .unwrap();
        let result = engine.solve_seeded(1, 0).unwrap();
        assert_eq!(result.temperature_levels, 2);
        assert!(result.final_temperature <= f64::MIN_POSITIVE);
    }

    #[test]
    fn test_seeded_runs_identical() {
        let (w, d) = chr_like();
        let config = AnnealConfig::default().with_cooling_rate(0.9).with_seed(123);
        let problem = QapProblem::new(
            SquareMatrix::from_rows(w).unwrap(),
            SquareMatrix::from_rows(d).unwrap(),
        )
        .unwrap();
        let a = AnnealingEngine::with_config(problem.clone(), config.clone()).unwrap();
        let b = AnnealingEngine::with_config(problem, config).unwrap();
        assert_eq!(a.solve(20).unwrap(), b.solve(20).unwrap());
    }

    #[test]
    fn test_repeated_solves_independent() {
        let (w, d) = chr_like();
        let engine = AnnealingEngine::new(w, d, 0.9, 0.1, 10.0).unwrap();
        let first = engine.solve_seeded(10, 5).unwrap();
        let _ = engine.solve_seeded(10, 6).unwrap();
        assert_eq!(engine.solve_seeded(10, 5).unwrap(), first);
    }

    #[test]
    fn test_cancellation() {
        let (w, d) = chr_like();
        let engine = AnnealingEngine::new(w, d, 0.999, 1e-9, 1e9).unwrap();

        // Flag set before running so cancellation is deterministic.
        let cancel = Arc::new(AtomicBool::new(true));
        let mut rng = StdRng::seed_from_u64(42);

        let result = engine.solve_with_cancel(100, &mut rng, Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.iterations, 0);
        assert!(is_permutation(&result.best));
        assert_eq!(result.best_cost, result.initial_cost);
    }

    #[test]
    fn test_metropolis_accepts_uphill_when_hot() {
        let (w, d) = chr_like();
        let engine = AnnealingEngine::new(w, d, 0.99, 1e7, 1e8).unwrap();
        let result = engine.solve_seeded(1000, 42).unwrap();

        let acceptance_ratio = result.accepted_moves as f64 / result.iterations as f64;
        assert!(acceptance_ratio > 0.95, "expected high acceptance at high temp, got {acceptance_ratio}");
        assert!(result.accepted_moves > result.improving_moves);
    }
}
