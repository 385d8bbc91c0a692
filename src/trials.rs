//! Repeated solves against a known optimum.

use crate::error::{QapError, Result};
use crate::sa::AnnealingEngine;
use rand::Rng;

/// Optimality gap statistics over a batch of independent runs.
///
/// Gaps are percentages: `100 * (cost - optimum) / optimum`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GapStats {
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub max: f64,
    pub min: f64,
    pub trials: usize,
}

impl GapStats {
    /// Summarizes raw gap percentages. Returns `None` for an empty slice.
    pub fn from_gaps(gaps: &[f64]) -> Option<Self> {
        if gaps.is_empty() {
            return None;
        }
        let count = gaps.len() as f64;
        let mean = gaps.iter().sum::<f64>() / count;
        let variance = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / count;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
            max: gaps.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min: gaps.iter().copied().fold(f64::INFINITY, f64::min),
            trials: gaps.len(),
        })
    }
}

/// Runs `n_trials` independent anneals of `engine` and reports the gap of
/// each best cost to `optimum`.
pub fn run_trials<R: Rng>(
    engine: &AnnealingEngine,
    n_iters: usize,
    n_trials: usize,
    optimum: i64,
    rng: &mut R,
) -> Result<GapStats> {
    if n_trials == 0 {
        return Err(QapError::invalid("n_trials must be positive"));
    }
    if optimum <= 0 {
        return Err(QapError::invalid(format!("optimum must be positive, got {optimum}")));
    }

    let mut gaps = Vec::with_capacity(n_trials);
    for trial in 0..n_trials {
        let result = engine.solve_with_rng(n_iters, rng)?;
        let gap = 100.0 * (result.best_cost - optimum) as f64 / optimum as f64;
        log::debug!("trial {trial}: cost={}, gap={gap:.3}%", result.best_cost);
        gaps.push(gap);
    }

    GapStats::from_gaps(&gaps).ok_or_else(|| QapError::invalid("no trials were run"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gap_stats() {
        let stats = GapStats::from_gaps(&[0.0, 2.0, 4.0]).unwrap();
        assert!((stats.mean - 2.0).abs() < 1e-12);
        assert!((stats.std_dev - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.trials, 3);
        assert!(GapStats::from_gaps(&[]).is_none());
    }

    #[test]
    fn test_run_trials_symmetric_optimum() {
        let engine = AnnealingEngine::new(
            vec![vec![0, 1], vec![1, 0]],
            vec![vec![0, 2], vec![2, 0]],
            0.5,
            0.1,
            1.0,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let stats = run_trials(&engine, 4, 5, 4, &mut rng).unwrap();
        assert_eq!(stats.trials, 5);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_run_trials_gaps_non_negative_against_true_optimum() {
        let engine = AnnealingEngine::new(
            vec![vec![0, 3, 2], vec![1, 0, 3], vec![4, 6, 0]],
            vec![vec![0, 2, 3], vec![2, 0, 4], vec![5, 1, 0]],
            0.9,
            0.1,
            10.0,
        )
        .unwrap();
        let optimum = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]]
            .iter()
            .map(|p| engine.cost(p))
            .min()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let stats = run_trials(&engine, 20, 3, optimum, &mut rng).unwrap();
        assert!(stats.min >= 0.0);
        assert!(stats.max >= stats.mean && stats.mean >= stats.min);
    }

    #[test]
    fn test_run_trials_rejects_bad_arguments() {
        let engine = AnnealingEngine::new(vec![vec![1]], vec![vec![1]], 0.5, 0.1, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(run_trials(&engine, 1, 0, 1, &mut rng).is_err());
        assert!(run_trials(&engine, 1, 1, 0, &mut rng).is_err());
        assert!(run_trials(&engine, 0, 1, 1, &mut rng).is_err());
    }
}
