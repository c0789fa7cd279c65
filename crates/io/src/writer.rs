//! JSON result writer.

use std::path::Path;

use gmsel_pool::CandidatePool;
use gmsel_select::{SelectionReport, SelectionRun};
use gmsel_simulate::SimulatedPopulation;
use gmsel_target::TargetStatistics;
use serde::Serialize;
use tracing::info;

use crate::error::IoError;

/// One selected record in the output file.
#[derive(Debug, Clone, Serialize)]
pub struct SelectedRecord {
    /// Position within the selection.
    pub position: usize,
    /// Index into the screened candidate pool.
    pub pool_index: usize,
    /// Index into the source flatfile.
    pub original_index: usize,
    pub id: String,
    pub files: Vec<String>,
    /// Linear amplitude scale factor.
    pub scale_factor: f64,
}

/// Serializable summary of a selection run.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionOutput<'a> {
    pub records: Vec<SelectedRecord>,
    pub initial: &'a SelectionReport,
    #[serde(rename = "final")]
    pub final_report: &'a SelectionReport,
    pub early_exit: bool,
    pub n_replacements: usize,
    /// Metric value after each optimizer pass.
    pub history: &'a [f64],
    pub target: &'a TargetStatistics,
    pub population: &'a SimulatedPopulation,
}

impl<'a> SelectionOutput<'a> {
    /// Collects the output view of a finished run.
    pub fn new(run: &'a SelectionRun, pool: &CandidatePool, target: &'a TargetStatistics) -> Self {
        let selection = run.selection();
        let records = selection
            .indices()
            .iter()
            .zip(selection.scale_factors())
            .enumerate()
            .map(|(position, (&pool_index, scale_factor))| {
                let meta = pool.metadata(pool_index);
                SelectedRecord {
                    position,
                    pool_index,
                    original_index: meta.original_index,
                    id: meta.id.clone(),
                    files: meta.files.clone(),
                    scale_factor,
                }
            })
            .collect();
        let outcome = run.outcome();
        Self {
            records,
            initial: outcome.initial_report(),
            final_report: outcome.final_report(),
            early_exit: outcome.early_exit(),
            n_replacements: outcome.n_replacements(),
            history: outcome.history(),
            target,
            population: run.population(),
        }
    }
}

/// Writes `value` as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// [`IoError::Io`] if the file cannot be created, [`IoError::Json`] if
/// serialization fails.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), IoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| IoError::io(parent, e))?;
    }
    let file = std::fs::File::create(path).map_err(|e| IoError::io(path, e))?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| IoError::json(path, e))?;
    std::io::Write::flush(&mut writer).map_err(|e| IoError::io(path, e))?;
    info!(path = %path.display(), "output written");
    Ok(())
}
