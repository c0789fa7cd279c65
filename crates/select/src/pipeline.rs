//! End-to-end selection: simulate, match, optimise.

use gmsel_pool::CandidatePool;
use gmsel_simulate::{SimulatedPopulation, SimulationConfig, simulate};
use gmsel_target::TargetStatistics;
use serde::Serialize;
use tracing::info;

use crate::error::SelectError;
use crate::matcher::match_initial;
use crate::optimizer::{OptimizeConfig, OptimizeOutcome, metric_for_target, optimize};
use crate::selection::Selection;

/// Everything produced by [`select_records`].
#[derive(Debug, Clone, Serialize)]
pub struct SelectionRun {
    population: SimulatedPopulation,
    initial: Selection,
    outcome: OptimizeOutcome,
}

impl SelectionRun {
    /// Returns the simulated population the records were matched to.
    pub fn population(&self) -> &SimulatedPopulation {
        &self.population
    }

    /// Returns the selection produced by the initial matcher.
    pub fn initial(&self) -> &Selection {
        &self.initial
    }

    /// Returns the optimiser outcome, including the final selection.
    pub fn outcome(&self) -> &OptimizeOutcome {
        &self.outcome
    }

    /// Returns the final selection.
    pub fn selection(&self) -> &Selection {
        self.outcome.selection()
    }
}

/// Selects `simulation.n_gm()` records from `pool` matching `target`.
///
/// The simulated population is scored with the optimiser's metric; the
/// matcher and the optimiser share its scaling configuration.
#[tracing::instrument(skip_all, fields(n_gm = simulation.n_gm(), n_pool = pool.len()))]
pub fn select_records(
    target: &TargetStatistics,
    pool: &CandidatePool,
    simulation: &SimulationConfig,
    config: &OptimizeConfig,
) -> Result<SelectionRun, SelectError> {
    config.validate(target.len())?;
    if pool.len() < simulation.n_gm() {
        return Err(SelectError::PoolExhausted {
            required: simulation.n_gm(),
            available: pool.len(),
        });
    }

    let metric = metric_for_target(config.metric(), target);
    let population = simulate(target, simulation, &metric)?;
    let initial = match_initial(&population, pool, target, config.scaling())?;
    let outcome = optimize(target, &initial, pool, config)?;

    info!(
        initial_error = outcome.initial_report().error(),
        final_error = outcome.final_report().error(),
        max_percent_error = outcome.final_report().max_percent_error(),
        early_exit = outcome.early_exit(),
        "record selection finished"
    );
    Ok(SelectionRun {
        population,
        initial,
        outcome,
    })
}
