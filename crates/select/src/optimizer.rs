//! Greedy position-by-position improvement of a selection.

use std::cmp::Ordering;

use gmsel_metric::{ErrorMetric, MetricScratch, Objective};
use gmsel_pool::CandidatePool;
use gmsel_target::TargetStatistics;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::SelectError;
use crate::matcher::check_periods;
use crate::scaling::ScalingConfig;
use crate::selection::{Selection, SelectionReport, scale_into};

/// Deviation, in target standard deviations, beyond which a period counts
/// toward the outlier penalty.
const PENALTY_SIGMAS: f64 = 3.0;

/// Configuration for [`optimize`].
///
/// # Example
///
/// ```
/// use gmsel_metric::{ErrorMetric, Objective};
/// use gmsel_select::{OptimizeConfig, ScalingConfig};
///
/// let config = OptimizeConfig::new()
///     .with_n_loop(3)
///     .with_penalty(10.0)
///     .with_metric(ErrorMetric::new().with_objective(Objective::Ks))
///     .with_parallel(true);
/// assert_eq!(config.n_loop(), 3);
/// assert_eq!(config.scaling(), &ScalingConfig::disabled());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeConfig {
    scaling: ScalingConfig,
    n_loop: usize,
    metric: ErrorMetric,
    penalty: f64,
    tol: f64,
    parallel: bool,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizeConfig {
    /// Creates a configuration with defaults.
    ///
    /// Defaults: scaling disabled, `n_loop = 2`, default SSE metric,
    /// `penalty = 0`, `tol = 10` (percent), serial evaluation.
    pub fn new() -> Self {
        Self {
            scaling: ScalingConfig::disabled(),
            n_loop: 2,
            metric: ErrorMetric::new(),
            penalty: 0.0,
            tol: 10.0,
            parallel: false,
        }
    }

    /// Sets the scaling configuration.
    pub fn with_scaling(mut self, scaling: ScalingConfig) -> Self {
        self.scaling = scaling;
        self
    }

    /// Sets the number of full sweeps over the selection.
    pub fn with_n_loop(mut self, n_loop: usize) -> Self {
        self.n_loop = n_loop;
        self
    }

    /// Sets the error metric.
    pub fn with_metric(mut self, metric: ErrorMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Sets the outlier penalty weight (0 disables).
    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    /// Sets the early-exit tolerance on the stage-one percent error.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Evaluates candidates in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the scaling configuration.
    pub fn scaling(&self) -> &ScalingConfig {
        &self.scaling
    }

    /// Returns the number of sweeps.
    pub fn n_loop(&self) -> usize {
        self.n_loop
    }

    /// Returns the error metric.
    pub fn metric(&self) -> &ErrorMetric {
        &self.metric
    }

    /// Returns the penalty weight.
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    /// Returns the early-exit tolerance (percent).
    pub fn tol(&self) -> f64 {
        self.tol
    }

    /// Returns whether candidates are evaluated in parallel.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Validates the configuration for spectra of `n_periods` values.
    pub fn validate(&self, n_periods: usize) -> Result<(), SelectError> {
        self.metric.validate()?;
        self.scaling.validate(n_periods)?;
        if !self.penalty.is_finite() || self.penalty < 0.0 {
            return Err(SelectError::InvalidPenalty {
                penalty: self.penalty,
            });
        }
        if self.tol.is_nan() || self.tol < 0.0 {
            return Err(SelectError::InvalidTolerance { tol: self.tol });
        }
        Ok(())
    }
}

/// Result of [`optimize`].
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeOutcome {
    selection: Selection,
    initial_report: SelectionReport,
    final_report: SelectionReport,
    early_exit: bool,
    n_replacements: usize,
    history: Vec<f64>,
}

impl OptimizeOutcome {
    /// Returns the final selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Consumes the outcome, returning the final selection.
    pub fn into_selection(self) -> Selection {
        self.selection
    }

    /// Returns the report of the selection handed to the optimizer.
    pub fn initial_report(&self) -> &SelectionReport {
        &self.initial_report
    }

    /// Returns the report of the final selection.
    pub fn final_report(&self) -> &SelectionReport {
        &self.final_report
    }

    /// Returns `true` if optimisation was skipped because the initial
    /// selection was already within tolerance.
    pub fn early_exit(&self) -> bool {
        self.early_exit
    }

    /// Returns the number of accepted replacements (including rescalings).
    pub fn n_replacements(&self) -> usize {
        self.n_replacements
    }

    /// Returns the metric error after each sweep.
    pub fn history(&self) -> &[f64] {
        &self.history
    }
}

/// Returns `metric` with the target's conditioning period excluded from the
/// dispersion terms, unless an exclusion is already configured.
pub fn metric_for_target(metric: &ErrorMetric, target: &TargetStatistics) -> ErrorMetric {
    let excluded = metric.excluded_index().or(if target.is_conditional() {
        target.conditioning_index()
    } else {
        None
    });
    metric.clone().with_excluded_index(excluded)
}

/// A scored replacement candidate.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f64,
    record: usize,
    ln_scale: f64,
}

/// Orders by score (NaN last), then by pool index.
fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    let key = |s: f64| if s.is_nan() { f64::INFINITY } else { s };
    key(a.score)
        .total_cmp(&key(b.score))
        .then(a.record.cmp(&b.record))
}

/// Pure per-candidate evaluation for one position of one selection snapshot.
struct PositionEval<'a> {
    pool: &'a CandidatePool,
    target: &'a TargetStatistics,
    metric: &'a ErrorMetric,
    scaling: &'a ScalingConfig,
    penalty: f64,
    position: usize,
}

impl PositionEval<'_> {
    /// Scores `record` at the position. `trial` holds the selection's rows
    /// and only the row at the position is overwritten.
    fn evaluate(
        &self,
        record: usize,
        trial: &mut [f64],
        scratch: &mut MetricScratch,
    ) -> Option<Candidate> {
        let spectrum = self.pool.spectrum(record);
        let ln_scale = self.scaling.ln_scale(spectrum, self.target.mean())?;
        let n = spectrum.len();
        let row = &mut trial[self.position * n..(self.position + 1) * n];
        scale_into(spectrum, ln_scale, row);

        // Shapes were validated when scoring the current selection.
        let mut score = self
            .metric
            .score_with_scratch(trial, self.target, scratch)
            .ok()?;
        if self.penalty > 0.0 {
            let outliers = spectrum
                .iter()
                .zip(self.target.mean().iter().zip(self.target.std()))
                .filter(|&(x, (mu, sigma))| (ln_scale + x - mu).abs() > PENALTY_SIGMAS * sigma)
                .count();
            score += self.penalty * outliers as f64;
        }
        Some(Candidate {
            score,
            record,
            ln_scale,
        })
    }
}

/// Greedily improves `initial`.
///
/// Each of `n_loop` sweeps visits every position in order, removes its record
/// and tries every record not held at another position (the removed one
/// included). The best-scoring candidate (`E_trial + penalty × outliers`,
/// ties to the lowest pool index) replaces it only if strictly below the
/// current unpenalised error, so the metric never increases. In SSE mode the
/// initial selection is returned unchanged when its largest mean/std percent
/// error is below `tol`.
///
/// Serial and parallel evaluation return identical selections.
///
/// # Errors
///
/// Returns [`SelectError`] for an invalid configuration, mismatched period
/// counts, or a selection not drawn from `pool`.
#[tracing::instrument(skip_all, fields(n_gm = initial.len(), n_pool = pool.len(), n_loop = config.n_loop()))]
pub fn optimize(
    target: &TargetStatistics,
    initial: &Selection,
    pool: &CandidatePool,
    config: &OptimizeConfig,
) -> Result<OptimizeOutcome, SelectError> {
    let n_periods = target.len();
    check_periods("pool", pool.n_periods(), target)?;
    config.validate(n_periods)?;
    let metric = metric_for_target(config.metric(), target);
    // Rebuild so the rows are known to come from this pool.
    let mut selection = Selection::new(pool, initial.indices().to_vec(), initial.ln_scales().to_vec())?;

    let initial_report = SelectionReport::compute(&selection, target, &metric)?;
    if metric.objective() == Objective::Sse && initial_report.max_percent_error() < config.tol() {
        info!(
            max_percent_error = initial_report.max_percent_error(),
            tol = config.tol(),
            "initial selection within tolerance; skipping optimisation"
        );
        return Ok(OptimizeOutcome {
            final_report: initial_report.clone(),
            selection,
            initial_report,
            early_exit: true,
            n_replacements: 0,
            history: Vec::new(),
        });
    }

    let n_gm = selection.len();
    let mut in_use = vec![false; pool.len()];
    for &r in selection.indices() {
        in_use[r] = true;
    }
    let mut scratch = MetricScratch::new(n_gm);
    let mut trial = Vec::with_capacity(n_gm * n_periods);
    let mut history = Vec::with_capacity(config.n_loop());
    let mut n_replacements = 0;

    for sweep in 0..config.n_loop() {
        let mut sweep_replacements = 0;
        for position in 0..n_gm {
            let current = selection.indices()[position];
            let e_current = metric.score_with_scratch(selection.rows(), target, &mut scratch)?;
            let eval = PositionEval {
                pool,
                target,
                metric: &metric,
                scaling: config.scaling(),
                penalty: config.penalty(),
                position,
            };
            let blocked = |c: usize| in_use[c] && c != current;

            let best = if config.parallel() {
                let base = selection.rows();
                (0..pool.len())
                    .into_par_iter()
                    .filter(|&c| !blocked(c))
                    .map_init(
                        || (base.to_vec(), MetricScratch::new(n_gm)),
                        |(trial, scratch), c| eval.evaluate(c, trial, scratch),
                    )
                    .flatten()
                    .min_by(rank)
            } else {
                trial.clear();
                trial.extend_from_slice(selection.rows());
                let mut best: Option<Candidate> = None;
                for c in (0..pool.len()).filter(|&c| !blocked(c)) {
                    if let Some(cand) = eval.evaluate(c, &mut trial, &mut scratch)
                        && best.is_none_or(|b| rank(&cand, &b) == Ordering::Less)
                    {
                        best = Some(cand);
                    }
                }
                best
            };

            let Some(best) = best else {
                continue;
            };
            if best.score < e_current {
                let changed = best.record != current
                    || best.ln_scale != selection.ln_scales()[position];
                if changed {
                    debug!(
                        sweep,
                        position,
                        from = current,
                        to = best.record,
                        score = best.score,
                        "replaced record"
                    );
                    in_use[current] = false;
                    in_use[best.record] = true;
                    selection.replace(position, best.record, best.ln_scale, pool);
                    sweep_replacements += 1;
                }
            }
        }
        let error = metric.score_with_scratch(selection.rows(), target, &mut scratch)?;
        info!(sweep, error, replacements = sweep_replacements, "optimisation sweep finished");
        history.push(error);
        n_replacements += sweep_replacements;
    }

    let final_report = SelectionReport::compute(&selection, target, &metric)?;
    Ok(OptimizeOutcome {
        selection,
        initial_report,
        final_report,
        early_exit: false,
        n_replacements,
        history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gmsel_pool::RecordMetadata;
    use gmsel_target::PeriodGrid;

    fn target() -> TargetStatistics {
        let grid = PeriodGrid::new(vec![0.2, 1.0]).unwrap();
        TargetStatistics::from_moments(&grid, vec![0.0, 0.0], vec![1.0, 0.0, 0.0, 1.0]).unwrap()
    }

    fn pool() -> CandidatePool {
        let spectra = vec![
            5.0, 5.0, //
            -5.0, -5.0, //
            1.0, 1.0, //
            -1.0, -1.0, //
            0.0, 0.0,
        ];
        let meta = (0..5).map(|i| RecordMetadata::new(format!("r{i}"), 6.0, 10.0, 400.0)).collect();
        CandidatePool::new(2, spectra, meta).unwrap()
    }

    #[test]
    fn replaces_outliers() {
        let p = pool();
        let initial = Selection::new(&p, vec![0, 1], vec![0.0, 0.0]).unwrap();
        let config = OptimizeConfig::new().with_tol(0.0).with_n_loop(2);
        let out = optimize(&target(), &initial, &p, &config).unwrap();
        assert!(!out.early_exit());
        assert!(out.final_report().error() < out.initial_report().error());
        assert!(out.n_replacements() > 0);
        let mut idx = out.selection().indices().to_vec();
        idx.sort_unstable();
        idx.dedup();
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn zero_loops_is_identity() {
        let p = pool();
        let initial = Selection::new(&p, vec![2, 3], vec![0.0, 0.0]).unwrap();
        let config = OptimizeConfig::new().with_tol(0.0).with_n_loop(0);
        let out = optimize(&target(), &initial, &p, &config).unwrap();
        assert_eq!(out.selection(), &initial);
        assert!(out.history().is_empty());
    }

    #[test]
    fn invalid_penalty_rejected() {
        let p = pool();
        let initial = Selection::new(&p, vec![2, 3], vec![0.0, 0.0]).unwrap();
        let config = OptimizeConfig::new().with_penalty(-1.0);
        assert_eq!(
            optimize(&target(), &initial, &p, &config).unwrap_err(),
            SelectError::InvalidPenalty { penalty: -1.0 }
        );
    }

    #[test]
    fn rank_orders_nan_last_and_ties_by_index() {
        let c = |score, record| Candidate {
            score,
            record,
            ln_scale: 0.0,
        };
        assert_eq!(rank(&c(1.0, 5), &c(1.0, 2)), Ordering::Greater);
        assert_eq!(rank(&c(f64::NAN, 0), &c(1e300, 9)), Ordering::Greater);
        assert_eq!(rank(&c(0.5, 9), &c(1.0, 0)), Ordering::Less);
    }

    #[test]
    fn metric_exclusion_follows_conditioning() {
        let t = target();
        let m = metric_for_target(&ErrorMetric::new(), &t);
        assert_eq!(m.excluded_index(), None);
        let m = metric_for_target(&ErrorMetric::new().with_excluded_index(Some(1)), &t);
        assert_eq!(m.excluded_index(), Some(1));
    }
}
