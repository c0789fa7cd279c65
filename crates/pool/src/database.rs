//! Unfiltered record spectra on their native period lists.

use crate::error::PoolError;
use crate::record::RecordMetadata;

/// One database record with ln Sa sampled at its own periods.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSpectrum {
    metadata: RecordMetadata,
    periods: Vec<f64>,
    ln_sa: Vec<f64>,
}

impl RecordSpectrum {
    /// Creates a record from its metadata, periods (s) and ln Sa (g).
    pub fn new(metadata: RecordMetadata, periods: Vec<f64>, ln_sa: Vec<f64>) -> Self {
        Self {
            metadata,
            periods,
            ln_sa,
        }
    }

    /// Returns the metadata.
    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    /// Returns the native periods.
    pub fn periods(&self) -> &[f64] {
        &self.periods
    }

    /// Returns ln Sa at the native periods.
    pub fn ln_sa(&self) -> &[f64] {
        &self.ln_sa
    }

    /// Interpolates ln Sa linearly in ln T onto `periods`.
    ///
    /// Returns `None` if any requested period lies outside the record's range.
    pub fn resample(&self, periods: &[f64]) -> Option<Vec<f64>> {
        periods
            .iter()
            .map(|&t| gmsel_stats::interp_ln_period(&self.periods, &self.ln_sa, t))
            .collect()
    }

    fn validate(&self, record: usize) -> Result<(), PoolError> {
        if self.periods.len() != self.ln_sa.len() {
            return Err(PoolError::DimensionMismatch {
                record,
                len: self.ln_sa.len(),
                expected: self.periods.len(),
            });
        }
        if self.periods.is_empty()
            || self.periods.iter().any(|t| !(t.is_finite() && *t > 0.0))
            || self.periods.windows(2).any(|w| w[1] <= w[0])
        {
            return Err(PoolError::InvalidPeriods { record });
        }
        if self.ln_sa.iter().any(|v| !v.is_finite()) {
            return Err(PoolError::NonFiniteSpectrum { record });
        }
        Ok(())
    }
}

/// The record database from which a candidate pool is screened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectraDatabase {
    records: Vec<RecordSpectrum>,
}

impl SpectraDatabase {
    /// Creates a database, validating every record.
    ///
    /// # Errors
    ///
    /// [`PoolError`] naming the first malformed record.
    pub fn new(records: Vec<RecordSpectrum>) -> Result<Self, PoolError> {
        for (i, r) in records.iter().enumerate() {
            r.validate(i)?;
        }
        Ok(Self { records })
    }

    /// Returns the records.
    pub fn records(&self) -> &[RecordSpectrum] {
        &self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the database is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn resample_log_log() {
        let r = RecordSpectrum::new(
            RecordMetadata::new("a", 6.0, 10.0, 400.0),
            vec![0.1, 1.0],
            vec![0.0, -2.0],
        );
        let out = r.resample(&[0.1, 0.1_f64.sqrt(), 1.0]).unwrap();
        assert_eq!(out[0], 0.0);
        assert_abs_diff_eq!(out[1], -1.0, epsilon = 1e-12);
        assert_eq!(out[2], -2.0);
        assert!(r.resample(&[2.0]).is_none());
    }

    #[test]
    fn malformed_records_rejected() {
        let meta = RecordMetadata::new("a", 6.0, 10.0, 400.0);
        let bad_len = RecordSpectrum::new(meta.clone(), vec![0.1, 1.0], vec![0.0]);
        assert!(matches!(
            SpectraDatabase::new(vec![bad_len]),
            Err(PoolError::DimensionMismatch { record: 0, .. })
        ));
        let bad_nan = RecordSpectrum::new(meta.clone(), vec![0.1, 1.0], vec![0.0, f64::NAN]);
        assert_eq!(
            SpectraDatabase::new(vec![bad_nan]).unwrap_err(),
            PoolError::NonFiniteSpectrum { record: 0 }
        );
        let bad_periods = RecordSpectrum::new(meta, vec![1.0, 0.1], vec![0.0, 0.0]);
        assert_eq!(
            SpectraDatabase::new(vec![bad_periods]).unwrap_err(),
            PoolError::InvalidPeriods { record: 0 }
        );
    }
}
