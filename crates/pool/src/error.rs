//! Error types for the gmsel-pool crate.

/// Error type for all fallible operations in the gmsel-pool crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PoolError {
    /// Returned when the grid has no periods.
    #[error("pool requires at least one period")]
    NoPeriods,

    /// Returned when a record's spectrum length differs from its period count.
    #[error("record {record}: spectrum has {len} values, expected {expected}")]
    DimensionMismatch {
        /// Position of the record in the input.
        record: usize,
        /// Length of the supplied spectrum.
        len: usize,
        /// Expected length.
        expected: usize,
    },

    /// Returned when the flat spectra and the metadata disagree on record count.
    #[error("{spectra} spectra but {metadata} metadata entries")]
    MetadataMismatch {
        /// Number of spectra.
        spectra: usize,
        /// Number of metadata entries.
        metadata: usize,
    },

    /// Returned when a log-spectrum contains NaN or infinity.
    #[error("record {record}: non-finite log-spectral value")]
    NonFiniteSpectrum {
        /// Position of the record in the input.
        record: usize,
    },

    /// Returned when a record's periods are not positive and strictly increasing.
    #[error("record {record}: periods must be positive and strictly increasing")]
    InvalidPeriods {
        /// Position of the record in the input.
        record: usize,
    },

    /// Returned when a filter bound is inverted or non-finite.
    #[error("invalid {field} filter range [{min}, {max}]")]
    InvalidFilter {
        /// Name of the filtered field.
        field: &'static str,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
}
