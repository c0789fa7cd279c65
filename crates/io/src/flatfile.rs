//! JSON record flatfile reader.
//!
//! ```json
//! {
//!   "periods": [0.01, 0.02, ...],
//!   "records": [
//!     {
//!       "id": "RSN6",
//!       "magnitude": 6.95,
//!       "distance_km": 12.1,
//!       "vs30": 219.3,
//!       "files": ["RSN6_H1.AT2", "RSN6_H2.AT2"],
//!       "spectra": { "rotd50": [...], "h1": [...], "h2": [...] }
//!     }
//!   ]
//! }
//! ```
//!
//! Spectral values are Sa in g. A record may carry its own `periods`, which
//! override the top-level list.

use std::collections::BTreeMap;
use std::path::Path;

use gmsel_pool::{RecordMetadata, RecordSpectrum, SpectraDatabase};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::IoError;

/// Which spectral ordinate the loader extracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ordinate {
    /// A single spectra column, e.g. `rotd50`.
    Single(String),
    /// Geometric mean of two component columns, e.g. `h1` and `h2`.
    GeometricMean(String, String),
}

impl Default for Ordinate {
    fn default() -> Self {
        Self::Single("rotd50".into())
    }
}

/// Configuration for reading a record flatfile.
#[derive(Debug, Clone, Default)]
pub struct FlatfileConfig {
    ordinate: Ordinate,
}

impl FlatfileConfig {
    /// Sets the spectral ordinate.
    pub fn with_ordinate(mut self, ordinate: Ordinate) -> Self {
        self.ordinate = ordinate;
        self
    }

    /// Returns the spectral ordinate.
    pub fn ordinate(&self) -> &Ordinate {
        &self.ordinate
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FlatfileDoc {
    #[serde(default)]
    periods: Option<Vec<f64>>,
    records: Vec<RecordDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordDoc {
    id: String,
    magnitude: f64,
    distance_km: f64,
    vs30: f64,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    periods: Option<Vec<f64>>,
    spectra: BTreeMap<String, Vec<f64>>,
}

/// Reads a record database from a JSON flatfile.
///
/// # Errors
///
/// [`IoError::FileNotFound`], [`IoError::Io`], [`IoError::Json`],
/// [`IoError::Validation`] when records lack periods or the requested
/// ordinate, or [`IoError::Pool`] for malformed spectra.
pub fn read_flatfile(path: &Path, config: &FlatfileConfig) -> Result<SpectraDatabase, IoError> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::io(path, e))?;
    let doc: FlatfileDoc = serde_json::from_str(&text).map_err(|e| IoError::json(path, e))?;
    let db = build_database(doc, config)?;
    info!(path = %path.display(), n_records = db.len(), "flatfile loaded");
    Ok(db)
}

/// Parses a record database from flatfile JSON text.
pub fn parse_flatfile(json: &str, config: &FlatfileConfig) -> Result<SpectraDatabase, IoError> {
    let doc: FlatfileDoc =
        serde_json::from_str(json).map_err(|e| IoError::json(Path::new("<str>"), e))?;
    build_database(doc, config)
}

fn build_database(doc: FlatfileDoc, config: &FlatfileConfig) -> Result<SpectraDatabase, IoError> {
    let mut problems = Vec::new();
    let mut records = Vec::with_capacity(doc.records.len());
    let mut n_nonpositive = 0;

    for (index, rec) in doc.records.into_iter().enumerate() {
        let Some(periods) = rec.periods.clone().or_else(|| doc.periods.clone()) else {
            problems.push(format!("record {}: no periods", rec.id));
            continue;
        };
        let sa = match select_ordinate(&rec.spectra, config.ordinate()) {
            Ok(sa) => sa,
            Err(column) => {
                problems.push(format!("record {}: missing spectra column '{column}'", rec.id));
                continue;
            }
        };
        if sa.iter().any(|&v| !(v > 0.0)) {
            debug!(id = %rec.id, "record has non-positive spectral values; skipped");
            n_nonpositive += 1;
            continue;
        }
        let ln_sa = sa.iter().map(|v| v.ln()).collect();
        let metadata = RecordMetadata::new(rec.id, rec.magnitude, rec.distance_km, rec.vs30)
            .with_files(rec.files)
            .with_original_index(index);
        records.push(RecordSpectrum::new(metadata, periods, ln_sa));
    }

    if !problems.is_empty() {
        return Err(IoError::Validation {
            count: problems.len(),
            details: problems.join("; "),
        });
    }
    if n_nonpositive > 0 {
        debug!(n_nonpositive, "records dropped for non-positive amplitudes");
    }
    Ok(SpectraDatabase::new(records)?)
}

/// Extracts Sa (g) for `ordinate`; on failure returns the missing column name.
fn select_ordinate(
    spectra: &BTreeMap<String, Vec<f64>>,
    ordinate: &Ordinate,
) -> Result<Vec<f64>, String> {
    let column = |name: &String| spectra.get(name).ok_or_else(|| name.clone());
    match ordinate {
        Ordinate::Single(name) => column(name).cloned(),
        Ordinate::GeometricMean(a, b) => {
            let (xa, xb) = (column(a)?, column(b)?);
            if xa.len() != xb.len() {
                return Err(format!("{a}/{b} (length mismatch)"));
            }
            Ok(xa.iter().zip(xb).map(|(p, q)| (p * q).sqrt()).collect())
        }
    }
}
