//! Metadata screening of database records.

use crate::error::PoolError;
use crate::record::RecordMetadata;

/// Inclusive bounds on record metadata. Unset bounds accept everything.
///
/// # Example
///
/// ```
/// use gmsel_pool::{RecordFilter, RecordMetadata};
///
/// let filter = RecordFilter::new().with_magnitude(6.0, 8.0).with_vs30(180.0, 760.0);
/// assert!(filter.accepts(&RecordMetadata::new("rsn1", 6.5, 20.0, 300.0)));
/// assert!(!filter.accepts(&RecordMetadata::new("rsn2", 5.0, 20.0, 300.0)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    magnitude: Option<(f64, f64)>,
    distance_km: Option<(f64, f64)>,
    vs30: Option<(f64, f64)>,
}

impl RecordFilter {
    /// Creates a filter accepting every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts magnitude to `[min, max]`.
    pub fn with_magnitude(mut self, min: f64, max: f64) -> Self {
        self.magnitude = Some((min, max));
        self
    }

    /// Restricts rupture distance (km) to `[min, max]`.
    pub fn with_distance(mut self, min: f64, max: f64) -> Self {
        self.distance_km = Some((min, max));
        self
    }

    /// Restricts Vs30 (m/s) to `[min, max]`.
    pub fn with_vs30(mut self, min: f64, max: f64) -> Self {
        self.vs30 = Some((min, max));
        self
    }

    /// Returns the magnitude bounds.
    pub fn magnitude(&self) -> Option<(f64, f64)> {
        self.magnitude
    }

    /// Returns the distance bounds.
    pub fn distance(&self) -> Option<(f64, f64)> {
        self.distance_km
    }

    /// Returns the Vs30 bounds.
    pub fn vs30(&self) -> Option<(f64, f64)> {
        self.vs30
    }

    /// Validates that every set range is finite-or-infinite and ordered.
    pub fn validate(&self) -> Result<(), PoolError> {
        for (field, range) in [
            ("magnitude", self.magnitude),
            ("distance", self.distance_km),
            ("vs30", self.vs30),
        ] {
            if let Some((min, max)) = range
                && (min.is_nan() || max.is_nan() || min > max)
            {
                return Err(PoolError::InvalidFilter { field, min, max });
            }
        }
        Ok(())
    }

    /// Returns `true` if `meta` lies inside every set range.
    pub fn accepts(&self, meta: &RecordMetadata) -> bool {
        let within = |range: Option<(f64, f64)>, v: f64| match range {
            Some((min, max)) => v >= min && v <= max,
            None => true,
        };
        within(self.magnitude, meta.magnitude)
            && within(self.distance_km, meta.distance_km)
            && within(self.vs30, meta.vs30)
    }
}
