//! Per-period moments of a set of log-spectra.

use serde::Serialize;

use crate::error::MetricError;

/// Reusable buffers for repeated metric evaluation.
///
/// Holding one of these across calls to
/// [`ErrorMetric::score_with_scratch`](crate::ErrorMetric::score_with_scratch)
/// avoids a column allocation per evaluation.
#[derive(Debug, Clone, Default)]
pub struct MetricScratch {
    pub(crate) column: Vec<f64>,
}

impl MetricScratch {
    /// Creates scratch space for samples of up to `max_rows` spectra.
    pub fn new(max_rows: usize) -> Self {
        Self {
            column: Vec::with_capacity(max_rows),
        }
    }
}

/// Empirical mean, standard deviation (N−1) and biased skewness per period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleStats {
    mean: Vec<f64>,
    std: Vec<f64>,
    skew: Vec<f64>,
}

impl SampleStats {
    /// Computes per-period moments of `rows`, a row-major block of spectra
    /// with `n_periods` values each.
    ///
    /// # Errors
    ///
    /// [`MetricError::EmptySample`] or [`MetricError::DimensionMismatch`].
    pub fn from_rows(rows: &[f64], n_periods: usize) -> Result<Self, MetricError> {
        let n_rows = check_rows(rows, n_periods)?;
        let mut scratch = MetricScratch::new(n_rows);
        let mut stats = Self {
            mean: Vec::with_capacity(n_periods),
            std: Vec::with_capacity(n_periods),
            skew: Vec::with_capacity(n_periods),
        };
        for p in 0..n_periods {
            load_column(rows, n_periods, p, &mut scratch.column);
            let col = &scratch.column;
            stats.mean.push(gmsel_stats::mean(col));
            stats.std.push(gmsel_stats::sd(col));
            stats.skew.push(gmsel_stats::skewness(col));
        }
        Ok(stats)
    }

    /// Returns the per-period mean.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Returns the per-period standard deviation.
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Returns the per-period skewness.
    pub fn skew(&self) -> &[f64] {
        &self.skew
    }

    /// Returns the number of periods.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Returns `true` if there are no periods.
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// Validates a row-major block and returns its row count.
pub(crate) fn check_rows(rows: &[f64], n_periods: usize) -> Result<usize, MetricError> {
    if rows.is_empty() || n_periods == 0 {
        return Err(MetricError::EmptySample);
    }
    if rows.len() % n_periods != 0 {
        return Err(MetricError::DimensionMismatch {
            len: rows.len(),
            n_periods,
        });
    }
    Ok(rows.len() / n_periods)
}

/// Copies column `p` of a row-major block into `out`.
pub(crate) fn load_column(rows: &[f64], n_periods: usize, p: usize, out: &mut Vec<f64>) {
    out.clear();
    out.extend(rows.chunks_exact(n_periods).map(|row| row[p]));
}
