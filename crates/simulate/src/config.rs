//! Simulation configuration.

use crate::error::SimulateError;

/// Configuration for [`simulate`](crate::simulate).
///
/// # Example
///
/// ```
/// use gmsel_simulate::SimulationConfig;
///
/// let config = SimulationConfig::new(30).with_n_trials(50).with_seed(7);
/// assert_eq!(config.seed(), Some(7));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    n_gm: usize,
    n_trials: usize,
    seed: Option<u64>,
    correlation_weight: f64,
}

impl SimulationConfig {
    /// Creates a configuration drawing `n_gm` spectra per trial.
    ///
    /// Defaults: `n_trials = 20`, `seed = None`, `correlation_weight = 1.0`.
    pub fn new(n_gm: usize) -> Self {
        Self {
            n_gm,
            n_trials: 20,
            seed: None,
            correlation_weight: 1.0,
        }
    }

    /// Sets the number of independent trials.
    pub fn with_n_trials(mut self, n_trials: usize) -> Self {
        self.n_trials = n_trials;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets an optional seed; `None` draws from OS entropy.
    pub fn with_seed_opt(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the weight of the correlation-matrix term in the trial error.
    pub fn with_correlation_weight(mut self, weight: f64) -> Self {
        self.correlation_weight = weight;
        self
    }

    /// Returns the number of spectra per trial.
    pub fn n_gm(&self) -> usize {
        self.n_gm
    }

    /// Returns the number of trials.
    pub fn n_trials(&self) -> usize {
        self.n_trials
    }

    /// Returns the random seed, if set.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the correlation-term weight.
    pub fn correlation_weight(&self) -> f64 {
        self.correlation_weight
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SimulateError> {
        if self.n_gm < 1 {
            return Err(SimulateError::InvalidNGm { n_gm: self.n_gm });
        }
        if self.n_trials < 1 {
            return Err(SimulateError::InvalidTrials {
                n_trials: self.n_trials,
            });
        }
        if !self.correlation_weight.is_finite() || self.correlation_weight < 0.0 {
            return Err(SimulateError::InvalidCorrelationWeight {
                value: self.correlation_weight,
            });
        }
        Ok(())
    }
}
