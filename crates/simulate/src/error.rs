//! Error types for the gmsel-simulate crate.

use gmsel_metric::MetricError;

/// Error type for all fallible operations in the gmsel-simulate crate.
///
/// Numerical failures of the covariance factorisation are not errors: the
/// sampler degrades to deterministic replication of the mean instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulateError {
    /// Error scoring a trial population.
    #[error(transparent)]
    Metric(#[from] MetricError),

    /// Returned when the number of spectra per trial is zero.
    #[error("n_gm must be >= 1, got {n_gm}")]
    InvalidNGm {
        /// The invalid count.
        n_gm: usize,
    },

    /// Returned when the number of trials is zero.
    #[error("n_trials must be >= 1, got {n_trials}")]
    InvalidTrials {
        /// The invalid count.
        n_trials: usize,
    },

    /// Returned when the correlation weight is negative or non-finite.
    #[error("correlation weight must be finite and non-negative, got {value}")]
    InvalidCorrelationWeight {
        /// The invalid weight.
        value: f64,
    },

    /// Returned when the target has no periods.
    #[error("target has no periods")]
    EmptyTarget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_trials() {
        assert_eq!(
            SimulateError::InvalidTrials { n_trials: 0 }.to_string(),
            "n_trials must be >= 1, got 0"
        );
    }

    #[test]
    fn error_transparent_metric() {
        let err: SimulateError = MetricError::EmptySample.into();
        assert_eq!(err.to_string(), "sample contains no spectra");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<SimulateError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<SimulateError>();
    }
}
