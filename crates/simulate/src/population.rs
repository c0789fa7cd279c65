//! Output of the spectral simulator.

use gmsel_metric::{MetricError, SampleStats};
use serde::Serialize;

/// The best trial of simulated log-spectra.
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedPopulation {
    /// Row-major spectra, `n_gm × n_periods`.
    spectra: Vec<f64>,
    n_periods: usize,
    /// Zero-based index of the retained trial.
    best_trial: usize,
    /// Trial error of the retained trial.
    error: f64,
    /// Whether every spectrum equals the target mean.
    deterministic: bool,
}

impl SimulatedPopulation {
    pub(crate) fn new(
        spectra: Vec<f64>,
        n_periods: usize,
        best_trial: usize,
        error: f64,
        deterministic: bool,
    ) -> Self {
        Self {
            spectra,
            n_periods,
            best_trial,
            error,
            deterministic,
        }
    }

    /// Builds a population from externally supplied spectra.
    ///
    /// Returns `None` unless `spectra.len()` is a non-zero multiple of
    /// `n_periods`.
    pub fn from_rows(spectra: Vec<f64>, n_periods: usize) -> Option<Self> {
        if n_periods == 0 || spectra.is_empty() || spectra.len() % n_periods != 0 {
            return None;
        }
        Some(Self::new(spectra, n_periods, 0, f64::NAN, false))
    }

    /// Returns spectrum `i`.
    pub fn spectrum(&self, i: usize) -> &[f64] {
        &self.spectra[i * self.n_periods..(i + 1) * self.n_periods]
    }

    /// Iterates over the spectra in order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.spectra.chunks_exact(self.n_periods)
    }

    /// Returns the flat row-major spectra.
    pub fn rows(&self) -> &[f64] {
        &self.spectra
    }

    /// Returns the number of spectra.
    pub fn len(&self) -> usize {
        self.spectra.len() / self.n_periods
    }

    /// Returns `true` if there are no spectra.
    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }

    /// Returns the number of periods per spectrum.
    pub fn n_periods(&self) -> usize {
        self.n_periods
    }

    /// Returns the index of the retained trial.
    pub fn best_trial(&self) -> usize {
        self.best_trial
    }

    /// Returns the trial error of the retained trial.
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Returns `true` if every spectrum equals the target mean.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Per-period moments of the population.
    pub fn stats(&self) -> Result<SampleStats, MetricError> {
        SampleStats::from_rows(&self.spectra, self.n_periods)
    }
}
