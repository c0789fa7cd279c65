//! Select command: target, candidate pool, selection and output.

use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span};

use gmsel_io::{SelectionOutput, read_flatfile, write_json};
use gmsel_pool::CandidatePool;
use gmsel_select::select_records;

use crate::cli::SelectArgs;
use crate::config;
use crate::convert;
use crate::target_cmd;

/// Run the full selection pipeline.
pub fn run(args: SelectArgs) -> Result<()> {
    let _cmd = info_span!("select").entered();
    let config = config::load(&args.config)?;

    // CLI flags override the config file.
    let output = args
        .output
        .or_else(|| config.io.output.clone())
        .ok_or_else(|| anyhow!("no output path: set [io].output in config or use --output"))?;
    let seed = args.seed.or(config.seed);

    // Every setting is validated before any file is read.
    let setup = target_cmd::prepare(&config)?;
    let flatfile_cfg = convert::build_flatfile_config(&config.io);
    let filter = convert::build_filter(&config.filter)?;
    let simulation =
        convert::build_simulation_config(&config.selection, &config.simulation, seed)?;
    let optimize =
        convert::build_optimize_config(&config.optimize, &config.selection, &setup.grid)?;

    let target = target_cmd::build_target(&config, &setup)?;

    let database_path = &config.io.database;
    let database = read_flatfile(database_path, &flatfile_cfg)
        .with_context(|| format!("failed to read flatfile: {}", database_path.display()))?;
    let pool = CandidatePool::from_database(&database, target.periods(), &filter)
        .context("failed to build candidate pool")?;
    info!(
        n_records = database.len(),
        n_candidates = pool.len(),
        "candidate pool ready"
    );

    let run = select_records(&target, &pool, &simulation, &optimize)
        .context("record selection failed")?;

    let report = run.outcome().final_report();
    info!(
        error = report.error(),
        max_percent_error = report.max_percent_error(),
        n_replacements = run.outcome().n_replacements(),
        "selection complete"
    );

    write_json(&output, &SelectionOutput::new(&run, &pool, &target))
        .with_context(|| format!("failed to write selection: {}", output.display()))?;
    Ok(())
}
