//! Record metadata and borrowed record views.

use serde::{Deserialize, Serialize};

/// Descriptive metadata of a ground-motion record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Database identifier (e.g. an NGA record sequence number).
    pub id: String,
    /// Earthquake moment magnitude.
    pub magnitude: f64,
    /// Rupture distance (km).
    pub distance_km: f64,
    /// Time-averaged shear-wave velocity of the top 30 m (m/s).
    pub vs30: f64,
    /// Time-history file names, one per component.
    #[serde(default)]
    pub files: Vec<String>,
    /// Position of the record in the source database.
    #[serde(default)]
    pub original_index: usize,
}

impl RecordMetadata {
    /// Creates metadata with no file names and `original_index = 0`.
    pub fn new(id: impl Into<String>, magnitude: f64, distance_km: f64, vs30: f64) -> Self {
        Self {
            id: id.into(),
            magnitude,
            distance_km,
            vs30,
            files: Vec::new(),
            original_index: 0,
        }
    }

    /// Sets the file names.
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    /// Sets the source database index.
    pub fn with_original_index(mut self, index: usize) -> Self {
        self.original_index = index;
        self
    }
}

/// A pool record: its pool index, log-spectrum on the grid and metadata.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRecord<'a> {
    /// Index into the pool.
    pub index: usize,
    /// ln Sa at the grid periods.
    pub spectrum: &'a [f64],
    /// Record metadata.
    pub metadata: &'a RecordMetadata,
}
