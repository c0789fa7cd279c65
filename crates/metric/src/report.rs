//! Percent-error summaries of a sample against the target.

use gmsel_target::TargetStatistics;
use serde::Serialize;

use crate::sample::SampleStats;

/// Target standard deviation below which a std percent error is undefined.
pub const STD_FLOOR: f64 = 1e-10;

/// Per-period percent errors of the sample median and dispersion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentErrors {
    mean: Vec<f64>,
    std: Vec<Option<f64>>,
    max_mean: f64,
    max_std: f64,
}

impl PercentErrors {
    /// Compares sample moments with the target.
    ///
    /// Mean error is `100·|exp(m̂ − μ) − 1|` (median spectra in g). Std error
    /// is `100·|ŝ − σ| / σ`, or `None` where `σ < STD_FLOOR`; undefined
    /// periods are excluded from the maximum.
    pub fn compute(stats: &SampleStats, target: &TargetStatistics) -> Self {
        let n = stats.len().min(target.len());
        let mean: Vec<f64> = (0..n)
            .map(|p| 100.0 * ((stats.mean()[p] - target.mean()[p]).exp() - 1.0).abs())
            .collect();
        let std: Vec<Option<f64>> = (0..n)
            .map(|p| {
                let sigma = target.std()[p];
                (sigma >= STD_FLOOR).then(|| 100.0 * (stats.std()[p] - sigma).abs() / sigma)
            })
            .collect();
        let max_mean = mean.iter().copied().fold(0.0, f64::max);
        let max_std = std.iter().flatten().copied().fold(0.0, f64::max);
        Self {
            mean,
            std,
            max_mean,
            max_std,
        }
    }

    /// Returns the per-period mean percent error.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Returns the per-period std percent error, `None` where undefined.
    pub fn std(&self) -> &[Option<f64>] {
        &self.std
    }

    /// Returns the largest mean percent error.
    pub fn max_mean(&self) -> f64 {
        self.max_mean
    }

    /// Returns the largest defined std percent error (0 if none is defined).
    pub fn max_std(&self) -> f64 {
        self.max_std
    }

    /// Returns `max(max_mean, max_std)`.
    pub fn max(&self) -> f64 {
        self.max_mean.max(self.max_std)
    }
}
