//! Error types for the gmsel-metric crate.

/// Error type for all fallible operations in the gmsel-metric crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    /// Returned when an error-term weight is negative or non-finite.
    #[error("{term} weight must be finite and non-negative, got {value}")]
    InvalidWeight {
        /// Which term the weight applies to (`mean`, `std`, `skew`).
        term: &'static str,
        /// The invalid weight.
        value: f64,
    },

    /// Returned when a sample has no spectra.
    #[error("sample contains no spectra")]
    EmptySample,

    /// Returned when the sample length is not a multiple of the period count.
    #[error("sample length {len} is not a multiple of {n_periods} periods")]
    DimensionMismatch {
        /// Length of the flat sample.
        len: usize,
        /// Number of target periods.
        n_periods: usize,
    },

    /// Returned when the excluded period index lies outside the target.
    #[error("excluded period index {index} out of range for {n_periods} periods")]
    ExcludedIndexOutOfRange {
        /// The configured index.
        index: usize,
        /// Number of target periods.
        n_periods: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_weight() {
        let err = MetricError::InvalidWeight {
            term: "skew",
            value: -0.3,
        };
        assert_eq!(
            err.to_string(),
            "skew weight must be finite and non-negative, got -0.3"
        );
    }

    #[test]
    fn error_dimension_mismatch() {
        let err = MetricError::DimensionMismatch {
            len: 7,
            n_periods: 3,
        };
        assert_eq!(
            err.to_string(),
            "sample length 7 is not a multiple of 3 periods"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<MetricError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<MetricError>();
    }
}
