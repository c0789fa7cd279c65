//! Error-metric configuration.

use serde::{Deserialize, Serialize};

use crate::error::MetricError;

/// Weights of the mean, standard-deviation and skewness terms of the SSE.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// Weight of the squared mean deviation.
    pub mean: f64,
    /// Weight of the squared standard-deviation deviation.
    pub std: f64,
    /// Weight of the squared sample skewness.
    pub skew: f64,
}

impl Weights {
    /// Creates weights `[mean, std, skew]`.
    pub fn new(mean: f64, std: f64, skew: f64) -> Self {
        Self { mean, std, skew }
    }

    fn validate(&self) -> Result<(), MetricError> {
        for (term, value) in [("mean", self.mean), ("std", self.std), ("skew", self.skew)] {
            if !value.is_finite() || value < 0.0 {
                return Err(MetricError::InvalidWeight { term, value });
            }
        }
        Ok(())
    }
}

impl Default for Weights {
    /// `[1.0, 2.0, 0.3]`.
    fn default() -> Self {
        Self::new(1.0, 2.0, 0.3)
    }
}

/// Which discrepancy the metric computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    /// Weighted sum of squared errors of mean, std and skewness.
    #[default]
    Sse,
    /// Kolmogorov–Smirnov statistic against the target normal marginals.
    Ks,
}

/// How per-period KS statistics are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KsAggregate {
    /// Sum over periods.
    #[default]
    Sum,
    /// Maximum over periods.
    Max,
}

/// Scalar discrepancy between a set of log-spectra and the target.
///
/// # Example
///
/// ```
/// use gmsel_metric::{ErrorMetric, Objective, Weights};
///
/// let metric = ErrorMetric::new()
///     .with_weights(Weights::new(1.0, 1.0, 0.0))
///     .with_excluded_index(Some(3));
/// assert_eq!(metric.objective(), Objective::Sse);
/// assert!(metric.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMetric {
    weights: Weights,
    objective: Objective,
    ks_aggregate: KsAggregate,
    excluded_index: Option<usize>,
}

impl Default for ErrorMetric {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorMetric {
    /// Creates a metric with defaults.
    ///
    /// Defaults: SSE objective, weights `[1.0, 2.0, 0.3]`, KS sum, no
    /// excluded period.
    pub fn new() -> Self {
        Self {
            weights: Weights::default(),
            objective: Objective::Sse,
            ks_aggregate: KsAggregate::Sum,
            excluded_index: None,
        }
    }

    /// Sets the SSE term weights.
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the objective.
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Sets the KS aggregation.
    pub fn with_ks_aggregate(mut self, ks_aggregate: KsAggregate) -> Self {
        self.ks_aggregate = ks_aggregate;
        self
    }

    /// Sets the period excluded from the std and skewness terms
    /// (the conditioning period in conditional mode).
    pub fn with_excluded_index(mut self, index: Option<usize>) -> Self {
        self.excluded_index = index;
        self
    }

    /// Returns the SSE weights.
    pub fn weights(&self) -> Weights {
        self.weights
    }

    /// Returns the objective.
    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Returns the KS aggregation.
    pub fn ks_aggregate(&self) -> KsAggregate {
        self.ks_aggregate
    }

    /// Returns the excluded period index, if any.
    pub fn excluded_index(&self) -> Option<usize> {
        self.excluded_index
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), MetricError> {
        self.weights.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights() {
        let w = Weights::default();
        assert_eq!((w.mean, w.std, w.skew), (1.0, 2.0, 0.3));
    }

    #[test]
    fn negative_weight_rejected() {
        let metric = ErrorMetric::new().with_weights(Weights::new(1.0, -2.0, 0.3));
        assert_eq!(
            metric.validate().unwrap_err(),
            MetricError::InvalidWeight {
                term: "std",
                value: -2.0
            }
        );
    }

    #[test]
    fn nan_weight_rejected() {
        let metric = ErrorMetric::new().with_weights(Weights::new(f64::NAN, 2.0, 0.3));
        assert!(metric.validate().is_err());
    }

    #[test]
    fn builder_sets_fields() {
        let metric = ErrorMetric::new()
            .with_objective(Objective::Ks)
            .with_ks_aggregate(KsAggregate::Max)
            .with_excluded_index(Some(2));
        assert_eq!(metric.objective(), Objective::Ks);
        assert_eq!(metric.ks_aggregate(), KsAggregate::Max);
        assert_eq!(metric.excluded_index(), Some(2));
    }
}
