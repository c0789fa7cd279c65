//! Nearest-record matching of simulated spectra.

use gmsel_pool::CandidatePool;
use gmsel_simulate::SimulatedPopulation;
use gmsel_target::TargetStatistics;
use tracing::{debug, info};

use crate::error::SelectError;
use crate::scaling::ScalingConfig;
use crate::selection::Selection;

/// Checks that the pool and population share the target's period grid.
pub(crate) fn check_periods(
    what: &'static str,
    found: usize,
    target: &TargetStatistics,
) -> Result<(), SelectError> {
    if found != target.len() {
        return Err(SelectError::PeriodCountMismatch {
            what,
            found,
            expected: target.len(),
        });
    }
    Ok(())
}

/// Assigns each simulated spectrum, in order, the unused pool record closest
/// to it in log space.
///
/// Each candidate is scaled by `scaling` against the simulated spectrum and
/// scored by `Σ (ln s + x − y)²`; candidates whose scale falls outside the
/// bounds are skipped and ties go to the lowest pool index.
///
/// # Errors
///
/// [`SelectError::PoolExhausted`] when the pool (or the part of it admissible
/// at the scale bounds) holds fewer distinct records than the population.
#[tracing::instrument(skip_all, fields(n_gm = population.len(), n_pool = pool.len()))]
pub fn match_initial(
    population: &SimulatedPopulation,
    pool: &CandidatePool,
    target: &TargetStatistics,
    scaling: &ScalingConfig,
) -> Result<Selection, SelectError> {
    check_periods("pool", pool.n_periods(), target)?;
    check_periods("population", population.n_periods(), target)?;
    scaling.validate(target.len())?;

    let n_gm = population.len();
    if pool.len() < n_gm {
        return Err(SelectError::PoolExhausted {
            required: n_gm,
            available: pool.len(),
        });
    }

    let mut used = vec![false; pool.len()];
    let mut indices = Vec::with_capacity(n_gm);
    let mut ln_scales = Vec::with_capacity(n_gm);
    for (k, simulated) in population.iter().enumerate() {
        let mut best: Option<(usize, f64, f64)> = None;
        for (r, &taken) in used.iter().enumerate() {
            if taken {
                continue;
            }
            let record = pool.spectrum(r);
            let Some(ln_s) = scaling.ln_scale(record, simulated) else {
                continue;
            };
            let dist: f64 = record
                .iter()
                .zip(simulated)
                .map(|(x, y)| {
                    let d = ln_s + x - y;
                    d * d
                })
                .sum();
            if best.is_none_or(|(_, _, b)| dist < b) {
                best = Some((r, ln_s, dist));
            }
        }
        let Some((r, ln_s, dist)) = best else {
            return Err(SelectError::PoolExhausted {
                required: n_gm,
                available: indices.len(),
            });
        };
        debug!(position = k, record = r, dist, "matched simulated spectrum");
        used[r] = true;
        indices.push(r);
        ln_scales.push(ln_s);
    }

    info!(n_gm, "initial selection matched");
    Selection::new(pool, indices, ln_scales)
}
