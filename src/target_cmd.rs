//! Target command: compute and write the target spectrum statistics.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use gmsel_io::{read_gmpe_table, write_json};
use gmsel_target::{
    BakerJayaram2008, PeriodGrid, RuptureScenario, TargetConfig, TargetStatistics, compute_target,
};

use crate::cli::TargetArgs;
use crate::config::{self, GmselConfig};
use crate::convert;

/// Validated inputs of target construction.
pub struct TargetSetup {
    pub scenario: RuptureScenario,
    pub grid: PeriodGrid,
    pub config: TargetConfig,
}

/// Run the target-only pipeline.
pub fn run(args: TargetArgs) -> Result<()> {
    let _cmd = info_span!("target").entered();
    let config = config::load(&args.config)?;
    let setup = prepare(&config)?;
    let target = build_target(&config, &setup)?;
    write_json(&args.output, &target)
        .with_context(|| format!("failed to write target: {}", args.output.display()))?;
    Ok(())
}

/// Converts and validates the scenario, grid and conditioning settings.
pub fn prepare(config: &GmselConfig) -> Result<TargetSetup> {
    let scenario = convert::build_scenario(&config.scenario)?;
    let grid = convert::build_grid(&config.periods, &config.selection)?;
    let target_cfg = convert::build_target_config(&config.selection, &scenario)?;
    Ok(TargetSetup {
        scenario,
        grid,
        config: target_cfg,
    })
}

/// Reads the model table and computes the target for `setup`.
pub fn build_target(config: &GmselConfig, setup: &TargetSetup) -> Result<TargetStatistics> {
    let table = &config.io.gmpe_table;
    let gmpe = read_gmpe_table(table)
        .with_context(|| format!("failed to read GMPE table: {}", table.display()))?;

    let target = compute_target(
        &setup.grid,
        &setup.scenario,
        &gmpe,
        &BakerJayaram2008,
        &setup.config,
    )
    .context("target computation failed")?;
    info!(
        n_periods = target.len(),
        epsilon = ?target.epsilon(),
        "target ready"
    );
    Ok(target)
}
