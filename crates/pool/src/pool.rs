//! The read-only candidate pool consumed by record selection.

use tracing::{debug, info};

use crate::database::SpectraDatabase;
use crate::error::PoolError;
use crate::filter::RecordFilter;
use crate::record::{CandidateRecord, RecordMetadata};

/// Candidate records' ln Sa on the target period grid, with metadata.
///
/// Spectra are stored row-major, one row of `n_periods` values per record.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    n_periods: usize,
    spectra: Vec<f64>,
    metadata: Vec<RecordMetadata>,
}

impl CandidatePool {
    /// Creates a pool from spectra already on the grid.
    ///
    /// # Errors
    ///
    /// [`PoolError`] if `n_periods` is zero, the lengths disagree, or a
    /// value is non-finite.
    pub fn new(
        n_periods: usize,
        spectra: Vec<f64>,
        metadata: Vec<RecordMetadata>,
    ) -> Result<Self, PoolError> {
        if n_periods == 0 {
            return Err(PoolError::NoPeriods);
        }
        if spectra.len() != metadata.len() * n_periods {
            return Err(PoolError::MetadataMismatch {
                spectra: spectra.len() / n_periods,
                metadata: metadata.len(),
            });
        }
        if let Some(record) = spectra
            .chunks_exact(n_periods)
            .position(|row| row.iter().any(|v| !v.is_finite()))
        {
            return Err(PoolError::NonFiniteSpectrum { record });
        }
        Ok(Self {
            n_periods,
            spectra,
            metadata,
        })
    }

    /// Screens `database` with `filter` and interpolates the survivors onto
    /// `periods`. Records whose period range does not cover the grid are
    /// dropped.
    ///
    /// # Errors
    ///
    /// [`PoolError::NoPeriods`] or an invalid filter.
    #[tracing::instrument(skip_all, fields(n_records = database.len(), n_periods = periods.len()))]
    pub fn from_database(
        database: &SpectraDatabase,
        periods: &[f64],
        filter: &RecordFilter,
    ) -> Result<Self, PoolError> {
        filter.validate()?;
        if periods.is_empty() {
            return Err(PoolError::NoPeriods);
        }

        let mut spectra = Vec::new();
        let mut metadata = Vec::new();
        let mut n_filtered = 0;
        let mut n_uncovered = 0;
        for record in database.records() {
            if !filter.accepts(record.metadata()) {
                n_filtered += 1;
                continue;
            }
            match record.resample(periods) {
                Some(row) => {
                    spectra.extend_from_slice(&row);
                    metadata.push(record.metadata().clone());
                }
                None => {
                    debug!(id = %record.metadata().id, "record does not cover the period grid");
                    n_uncovered += 1;
                }
            }
        }

        info!(
            n_candidates = metadata.len(),
            n_filtered, n_uncovered, "candidate pool built"
        );
        Self::new(periods.len(), spectra, metadata)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    /// Returns `true` if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Returns the number of periods per spectrum.
    pub fn n_periods(&self) -> usize {
        self.n_periods
    }

    /// Returns the log-spectrum of record `i`.
    pub fn spectrum(&self, i: usize) -> &[f64] {
        &self.spectra[i * self.n_periods..(i + 1) * self.n_periods]
    }

    /// Returns the metadata of record `i`.
    pub fn metadata(&self, i: usize) -> &RecordMetadata {
        &self.metadata[i]
    }

    /// Returns the source database index of record `i`.
    pub fn original_index(&self, i: usize) -> usize {
        self.metadata[i].original_index
    }

    /// Returns record `i`.
    pub fn record(&self, i: usize) -> CandidateRecord<'_> {
        CandidateRecord {
            index: i,
            spectrum: self.spectrum(i),
            metadata: &self.metadata[i],
        }
    }

    /// Iterates over the records in pool order.
    pub fn iter(&self) -> impl Iterator<Item = CandidateRecord<'_>> {
        (0..self.len()).map(|i| self.record(i))
    }
}
