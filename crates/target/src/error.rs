//! Error types for the gmsel-target crate.

/// Error type for all fallible operations in the gmsel-target crate.
///
/// Covers invalid period grids, invalid rupture scenarios and ground-motion
/// model predictions that fall outside the model's valid domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TargetError {
    /// Returned when a period grid has no periods.
    #[error("period grid is empty")]
    EmptyGrid,

    /// Returned when periods are non-positive, non-finite or not strictly increasing.
    #[error("invalid period grid: {reason}")]
    InvalidGrid {
        /// Description of the violated constraint.
        reason: String,
    },

    /// Returned when a requested period lies outside the model's supported range.
    #[error("period {period} s outside supported range [{min}, {max}] s")]
    PeriodOutOfRange {
        /// The offending period.
        period: f64,
        /// Lower bound of the supported range.
        min: f64,
        /// Upper bound of the supported range.
        max: f64,
    },

    /// Returned when conditioning is requested but the grid has no reference period.
    #[error("conditional target requires a conditioning period in the grid")]
    MissingConditioningPeriod,

    /// Returned when a rupture scenario parameter is invalid.
    #[error("invalid scenario: {field} = {value}")]
    InvalidScenario {
        /// Name of the offending field.
        field: &'static str,
        /// The invalid value.
        value: f64,
    },

    /// Returned when a conditioning amplitude is not strictly positive and finite.
    #[error("target amplitude must be finite and positive, got {amplitude}")]
    InvalidAmplitude {
        /// The invalid amplitude (g).
        amplitude: f64,
    },

    /// Returned when the epsilon value is not finite.
    #[error("epsilon must be finite, got {epsilon}")]
    InvalidEpsilon {
        /// The invalid epsilon.
        epsilon: f64,
    },

    /// Returned when the ground-motion model returns a non-finite or negative value.
    #[error("ground-motion model returned invalid {quantity} at T = {period} s")]
    NonFinitePrediction {
        /// Which predicted quantity was invalid (`mean`, `std`, `correlation`).
        quantity: &'static str,
        /// Period at which the prediction failed.
        period: f64,
    },

    /// Returned when a tabulated model is malformed.
    #[error("invalid model table: {0}")]
    InvalidTable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_empty_grid() {
        assert_eq!(TargetError::EmptyGrid.to_string(), "period grid is empty");
    }

    #[test]
    fn error_period_out_of_range() {
        let err = TargetError::PeriodOutOfRange {
            period: 12.0,
            min: 0.01,
            max: 10.0,
        };
        assert_eq!(
            err.to_string(),
            "period 12 s outside supported range [0.01, 10] s"
        );
    }

    #[test]
    fn error_missing_conditioning() {
        assert_eq!(
            TargetError::MissingConditioningPeriod.to_string(),
            "conditional target requires a conditioning period in the grid"
        );
    }

    #[test]
    fn error_invalid_scenario() {
        let err = TargetError::InvalidScenario {
            field: "magnitude",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "invalid scenario: magnitude = -1");
    }

    #[test]
    fn error_invalid_amplitude() {
        let err = TargetError::InvalidAmplitude { amplitude: 0.0 };
        assert_eq!(
            err.to_string(),
            "target amplitude must be finite and positive, got 0"
        );
    }

    #[test]
    fn error_non_finite_prediction() {
        let err = TargetError::NonFinitePrediction {
            quantity: "std",
            period: 0.5,
        };
        assert_eq!(
            err.to_string(),
            "ground-motion model returned invalid std at T = 0.5 s"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<TargetError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<TargetError>();
    }
}
