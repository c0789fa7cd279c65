//! Error types for the gmsel-select crate.

use gmsel_metric::MetricError;
use gmsel_pool::PoolError;
use gmsel_simulate::SimulateError;
use gmsel_target::TargetError;

/// Error type for all fallible operations in the gmsel-select crate.
///
/// Wraps the errors of the upstream crates and adds the selection-specific
/// failures: pool exhaustion and inconsistent inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectError {
    /// Target construction error.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// Metric configuration or evaluation error.
    #[error(transparent)]
    Metric(#[from] MetricError),

    /// Spectral simulation error.
    #[error(transparent)]
    Simulate(#[from] SimulateError),

    /// Candidate pool error.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Returned when the pool cannot supply enough distinct admissible records.
    #[error("candidate pool exhausted: {required} records required, {available} available")]
    PoolExhausted {
        /// Records needed.
        required: usize,
        /// Records the pool could supply.
        available: usize,
    },

    /// Returned when spectra disagree on the number of periods.
    #[error("{what} has {found} periods, target has {expected}")]
    PeriodCountMismatch {
        /// Which input disagrees (`pool`, `population`).
        what: &'static str,
        /// Its period count.
        found: usize,
        /// The target period count.
        expected: usize,
    },

    /// Returned when the maximum scale factor is below 1 or non-finite.
    #[error("max_scale must be finite and >= 1, got {max_scale}")]
    InvalidMaxScale {
        /// The invalid bound.
        max_scale: f64,
    },

    /// Returned when the conditioning scaling index lies outside the grid.
    #[error("scaling period index {index} out of range for {n_periods} periods")]
    ScalingIndexOutOfRange {
        /// The configured index.
        index: usize,
        /// Number of periods.
        n_periods: usize,
    },

    /// Returned when the outlier penalty is negative or non-finite.
    #[error("penalty must be finite and non-negative, got {penalty}")]
    InvalidPenalty {
        /// The invalid penalty.
        penalty: f64,
    },

    /// Returned when the early-exit tolerance is negative or NaN.
    #[error("tolerance must be non-negative, got {tol}")]
    InvalidTolerance {
        /// The invalid tolerance (percent).
        tol: f64,
    },

    /// Returned when a selection is empty, repeats a record, or indexes past the pool.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}
