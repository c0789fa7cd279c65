//! JSON ground-motion model tables.

use std::path::Path;

use gmsel_target::TabulatedGmpe;
use serde::Deserialize;

use crate::error::IoError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableDoc {
    periods: Vec<f64>,
    mean_ln: Vec<f64>,
    std_ln: Vec<f64>,
}

/// Reads a tabulated model: `{"periods": [...], "mean_ln": [...], "std_ln": [...]}`.
///
/// # Errors
///
/// File and JSON errors, or [`IoError::Target`] for an invalid table.
pub fn read_gmpe_table(path: &Path) -> Result<TabulatedGmpe, IoError> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::io(path, e))?;
    let doc: TableDoc = serde_json::from_str(&text).map_err(|e| IoError::json(path, e))?;
    Ok(TabulatedGmpe::new(doc.periods, doc.mean_ln, doc.std_ln)?)
}
