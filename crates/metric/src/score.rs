//! Metric evaluation.

use gmsel_target::TargetStatistics;

use crate::config::{ErrorMetric, KsAggregate, Objective};
use crate::error::MetricError;
use crate::sample::{MetricScratch, SampleStats, check_rows, load_column};

impl ErrorMetric {
    /// Scores `rows` (row-major spectra, one value per target period)
    /// against `target`. Lower is better.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError`] for an empty or ragged sample, an excluded
    /// index outside the target, or invalid weights.
    pub fn score(&self, rows: &[f64], target: &TargetStatistics) -> Result<f64, MetricError> {
        let mut scratch = MetricScratch::new(rows.len() / target.len().max(1));
        self.score_with_scratch(rows, target, &mut scratch)
    }

    /// Like [`score`](Self::score), reusing `scratch` between calls.
    pub fn score_with_scratch(
        &self,
        rows: &[f64],
        target: &TargetStatistics,
        scratch: &mut MetricScratch,
    ) -> Result<f64, MetricError> {
        self.validate()?;
        let n_periods = target.len();
        check_rows(rows, n_periods)?;
        if let Some(index) = self.excluded_index()
            && index >= n_periods
        {
            return Err(MetricError::ExcludedIndexOutOfRange { index, n_periods });
        }

        let mut total = 0.0;
        for p in 0..n_periods {
            load_column(rows, n_periods, p, &mut scratch.column);
            let col = &scratch.column;
            let term = match self.objective() {
                Objective::Sse => self.sse_term(
                    p,
                    gmsel_stats::mean(col),
                    gmsel_stats::sd(col),
                    gmsel_stats::skewness(col),
                    target,
                ),
                Objective::Ks => gmsel_stats::ks_statistic(col, target.mean()[p], target.std()[p]),
            };
            total = match (self.objective(), self.ks_aggregate()) {
                (Objective::Ks, KsAggregate::Max) => f64::max(total, term),
                _ => total + term,
            };
        }
        Ok(total)
    }

    /// SSE of precomputed moments against `target`.
    ///
    /// Ignores the objective setting; KS needs the raw sample.
    pub fn sse_from_stats(&self, stats: &SampleStats, target: &TargetStatistics) -> f64 {
        (0..stats.len().min(target.len()))
            .map(|p| self.sse_term(p, stats.mean()[p], stats.std()[p], stats.skew()[p], target))
            .sum()
    }

    fn sse_term(&self, p: usize, mean: f64, std: f64, skew: f64, target: &TargetStatistics) -> f64 {
        let w = self.weights();
        let dm = mean - target.mean()[p];
        let mut term = w.mean * dm * dm;
        if self.excluded_index() != Some(p) {
            let ds = std - target.std()[p];
            term += w.std * ds * ds + w.skew * skew * skew;
        }
        term
    }
}
