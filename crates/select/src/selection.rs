//! Selected records, their scale factors and summary statistics.

use std::collections::HashSet;

use gmsel_metric::{ErrorMetric, MetricError, PercentErrors, SampleStats};
use gmsel_pool::CandidatePool;
use gmsel_target::TargetStatistics;
use serde::Serialize;

use crate::error::SelectError;

/// An ordered set of distinct pool records with log scale factors.
///
/// Keeps the scaled log-spectra (`ln s + x`) row-major so the metric can be
/// evaluated without touching the pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    indices: Vec<usize>,
    ln_scales: Vec<f64>,
    n_periods: usize,
    #[serde(skip)]
    rows: Vec<f64>,
}

impl Selection {
    /// Builds a selection of `indices` scaled by `exp(ln_scales)`.
    ///
    /// # Errors
    ///
    /// [`SelectError::InvalidSelection`] if empty, mismatched, duplicated or
    /// out of pool range.
    pub fn new(
        pool: &CandidatePool,
        indices: Vec<usize>,
        ln_scales: Vec<f64>,
    ) -> Result<Self, SelectError> {
        if indices.is_empty() {
            return Err(SelectError::InvalidSelection("no records".into()));
        }
        if indices.len() != ln_scales.len() {
            return Err(SelectError::InvalidSelection(format!(
                "{} records but {} scale factors",
                indices.len(),
                ln_scales.len()
            )));
        }
        let mut seen = HashSet::with_capacity(indices.len());
        for &i in &indices {
            if i >= pool.len() {
                return Err(SelectError::InvalidSelection(format!(
                    "record {i} outside pool of {}",
                    pool.len()
                )));
            }
            if !seen.insert(i) {
                return Err(SelectError::InvalidSelection(format!(
                    "record {i} selected twice"
                )));
            }
        }
        let n_periods = pool.n_periods();
        let mut rows = vec![0.0; indices.len() * n_periods];
        for (k, row) in rows.chunks_exact_mut(n_periods).enumerate() {
            scale_into(pool.spectrum(indices[k]), ln_scales[k], row);
        }
        Ok(Self {
            indices,
            ln_scales,
            n_periods,
            rows,
        })
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the selection is empty.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the pool indices of the selected records.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns the log scale factors.
    pub fn ln_scales(&self) -> &[f64] {
        &self.ln_scales
    }

    /// Returns the scale factors.
    pub fn scale_factors(&self) -> Vec<f64> {
        self.ln_scales.iter().map(|l| l.exp()).collect()
    }

    /// Returns the scaled log-spectra, row-major.
    pub fn rows(&self) -> &[f64] {
        &self.rows
    }

    /// Returns the scaled log-spectrum at `position`.
    pub fn spectrum(&self, position: usize) -> &[f64] {
        &self.rows[position * self.n_periods..(position + 1) * self.n_periods]
    }

    /// Returns `true` if `record` is selected.
    pub fn contains(&self, record: usize) -> bool {
        self.indices.contains(&record)
    }

    /// Per-period moments of the scaled log-spectra.
    pub fn stats(&self) -> Result<SampleStats, MetricError> {
        SampleStats::from_rows(&self.rows, self.n_periods)
    }

    /// Source database indices of the selected records.
    pub fn original_indices(&self, pool: &CandidatePool) -> Vec<usize> {
        self.indices.iter().map(|&i| pool.original_index(i)).collect()
    }

    /// Puts `record` at `position` with log scale `ln_scale`.
    pub(crate) fn replace(
        &mut self,
        position: usize,
        record: usize,
        ln_scale: f64,
        pool: &CandidatePool,
    ) {
        self.indices[position] = record;
        self.ln_scales[position] = ln_scale;
        let n = self.n_periods;
        scale_into(
            pool.spectrum(record),
            ln_scale,
            &mut self.rows[position * n..(position + 1) * n],
        );
    }
}

/// Writes `ln_scale + x` into `out`.
pub(crate) fn scale_into(spectrum: &[f64], ln_scale: f64, out: &mut [f64]) {
    for (o, &x) in out.iter_mut().zip(spectrum) {
        *o = ln_scale + x;
    }
}

/// Metric error and percent errors of a selection against the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionReport {
    error: f64,
    percent: PercentErrors,
    stats: SampleStats,
}

impl SelectionReport {
    /// Evaluates `selection` against `target` with `metric`.
    pub fn compute(
        selection: &Selection,
        target: &TargetStatistics,
        metric: &ErrorMetric,
    ) -> Result<Self, SelectError> {
        let error = metric.score(selection.rows(), target)?;
        let stats = selection.stats()?;
        let percent = PercentErrors::compute(&stats, target);
        Ok(Self {
            error,
            percent,
            stats,
        })
    }

    /// Returns the metric error.
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Returns the percent errors of the median and dispersion.
    pub fn percent(&self) -> &PercentErrors {
        &self.percent
    }

    /// Returns the empirical moments of the scaled log-spectra.
    pub fn stats(&self) -> &SampleStats {
        &self.stats
    }

    /// Largest of the mean and std percent errors.
    pub fn max_percent_error(&self) -> f64 {
        self.percent.max()
    }
}
