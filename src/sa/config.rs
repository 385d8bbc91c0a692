//! Annealing hyperparameters and the geometric cooling schedule.

use crate::error::{QapError, Result};

/// Configuration for a simulated annealing run.
///
/// Temperature starts at `initial_temperature` and is multiplied by
/// `cooling_rate` after every temperature level until it is no longer
/// above `min_temperature`.
///
/// # Examples
///
/// ```
/// use qap_anneal::sa::AnnealConfig;
///
/// let config = AnnealConfig::default()
///     .with_initial_temperature(100.0)
///     .with_min_temperature(0.01)
///     .with_cooling_rate(0.9)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealConfig {
    /// Initial temperature `T0`. Must exceed `min_temperature`.
    pub initial_temperature: f64,

    /// Terminal temperature `Tmin`. Must be positive.
    pub min_temperature: f64,

    /// Geometric cooling factor in (0, 1). Higher = slower cooling.
    pub cooling_rate: f64,

    /// Random seed used by `solve`. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            min_temperature: 1e-3,
            cooling_rate: 0.95,
            seed: None,
        }
    }
}

impl AnnealConfig {
    /// Builds a configuration from the three annealing hyperparameters.
    pub fn new(cooling_rate: f64, min_temperature: f64, initial_temperature: f64) -> Self {
        Self {
            initial_temperature,
            min_temperature,
            cooling_rate,
            seed: None,
        }
    }

    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let (t0, t_min, rate) = (self.initial_temperature, self.min_temperature, self.cooling_rate);
        if !(t0.is_finite() && t_min.is_finite() && rate.is_finite()) {
            return Err(QapError::invalid("hyperparameters must be finite"));
        }
        if t_min <= 0.0 {
            return Err(QapError::invalid(format!("min_temperature must be positive, got {t_min}")));
        }
        if !(t_min.is_normal() && t0.is_normal()) {
            return Err(QapError::invalid(format!(
                "temperatures must be normal floats, got T0={t0}, Tmin={t_min}"
            )));
        }
        if t0 <= t_min {
            return Err(QapError::invalid(format!(
                "initial_temperature ({t0}) must exceed min_temperature ({t_min})"
            )));
        }
        if rate <= 0.0 || rate >= 1.0 {
            return Err(QapError::invalid(format!("cooling_rate must be in (0, 1), got {rate}")));
        }
        Ok(())
    }

    /// Number of temperature levels a full run visits:
    /// `ceil(ln(Tmin / T0) / ln(rate))`.
    ///
    /// Only meaningful for a configuration that passes [`validate`](Self::validate).
    pub fn temperature_levels(&self) -> usize {
        let ratio = (self.min_temperature / self.initial_temperature).ln() / self.cooling_rate.ln();
        ratio.ceil() as usize
    }

    /// Applies one cooling step.
    #[inline]
    pub(crate) fn cool(&self, temperature: f64) -> f64 {
        temperature * self.cooling_rate
    }
}
