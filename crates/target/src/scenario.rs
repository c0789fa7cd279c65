//! Rupture scenario description passed to ground-motion models.

use serde::{Deserialize, Serialize};

use crate::error::TargetError;

/// Tectonic / regional classification used by region-dependent models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    /// Global (no regional adjustment).
    #[default]
    Global,
    /// California and similar active crustal regions.
    California,
    /// Japan.
    Japan,
    /// China and Turkey.
    ChinaTurkey,
    /// Italy.
    Italy,
}

/// Style of faulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultMechanism {
    /// Unspecified mechanism.
    #[default]
    Unspecified,
    /// Strike-slip.
    StrikeSlip,
    /// Normal.
    Normal,
    /// Reverse / thrust.
    Reverse,
}

/// Earthquake rupture scenario: the immutable input to target construction.
///
/// Use the builder methods to set optional parameters.
///
/// # Example
///
/// ```
/// use gmsel_target::{FaultMechanism, RuptureScenario};
///
/// let scenario = RuptureScenario::new(7.0, 10.0, 400.0)
///     .with_mechanism(FaultMechanism::StrikeSlip)
///     .with_target_amplitude(0.8);
///
/// assert!(scenario.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuptureScenario {
    magnitude: f64,
    distance_km: f64,
    vs30: f64,
    z2p5_km: Option<f64>,
    region: Region,
    mechanism: FaultMechanism,
    target_amplitude: Option<f64>,
}

impl RuptureScenario {
    /// Creates a scenario from moment magnitude, rupture distance (km) and
    /// Vs30 (m/s).
    ///
    /// Defaults: no basin depth, `Region::Global`, `FaultMechanism::Unspecified`,
    /// no target amplitude.
    pub fn new(magnitude: f64, distance_km: f64, vs30: f64) -> Self {
        Self {
            magnitude,
            distance_km,
            vs30,
            z2p5_km: None,
            region: Region::Global,
            mechanism: FaultMechanism::Unspecified,
            target_amplitude: None,
        }
    }

    /// Sets the basin depth Z2.5 (km).
    pub fn with_z2p5(mut self, z2p5_km: f64) -> Self {
        self.z2p5_km = Some(z2p5_km);
        self
    }

    /// Sets the region.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Sets the fault mechanism.
    pub fn with_mechanism(mut self, mechanism: FaultMechanism) -> Self {
        self.mechanism = mechanism;
        self
    }

    /// Sets the target spectral amplitude (g) at the conditioning period.
    pub fn with_target_amplitude(mut self, amplitude: f64) -> Self {
        self.target_amplitude = Some(amplitude);
        self
    }

    /// Returns the moment magnitude.
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Returns the rupture distance (km).
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Returns Vs30 (m/s).
    pub fn vs30(&self) -> f64 {
        self.vs30
    }

    /// Returns the basin depth Z2.5 (km), if set.
    pub fn z2p5_km(&self) -> Option<f64> {
        self.z2p5_km
    }

    /// Returns the region.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Returns the fault mechanism.
    pub fn mechanism(&self) -> FaultMechanism {
        self.mechanism
    }

    /// Returns the target amplitude (g) at the conditioning period, if set.
    pub fn target_amplitude(&self) -> Option<f64> {
        self.target_amplitude
    }

    /// Validates the scenario parameters.
    ///
    /// Requires a finite positive magnitude, a finite non-negative distance,
    /// a finite positive Vs30, a finite non-negative Z2.5 when given and a
    /// finite positive target amplitude when given.
    pub fn validate(&self) -> Result<(), TargetError> {
        if !self.magnitude.is_finite() || self.magnitude <= 0.0 {
            return Err(TargetError::InvalidScenario {
                field: "magnitude",
                value: self.magnitude,
            });
        }
        if !self.distance_km.is_finite() || self.distance_km < 0.0 {
            return Err(TargetError::InvalidScenario {
                field: "distance_km",
                value: self.distance_km,
            });
        }
        if !self.vs30.is_finite() || self.vs30 <= 0.0 {
            return Err(TargetError::InvalidScenario {
                field: "vs30",
                value: self.vs30,
            });
        }
        if let Some(z) = self.z2p5_km
            && (!z.is_finite() || z < 0.0)
        {
            return Err(TargetError::InvalidScenario {
                field: "z2p5_km",
                value: z,
            });
        }
        if let Some(a) = self.target_amplitude
            && (!a.is_finite() || a <= 0.0)
        {
            return Err(TargetError::InvalidAmplitude { amplitude: a });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = RuptureScenario::new(6.5, 20.0, 760.0);
        assert_eq!(s.region(), Region::Global);
        assert_eq!(s.mechanism(), FaultMechanism::Unspecified);
        assert_eq!(s.z2p5_km(), None);
        assert_eq!(s.target_amplitude(), None);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn builder_chaining() {
        let s = RuptureScenario::new(7.2, 5.0, 300.0)
            .with_z2p5(1.2)
            .with_region(Region::Japan)
            .with_mechanism(FaultMechanism::Reverse)
            .with_target_amplitude(1.1);
        assert_eq!(s.z2p5_km(), Some(1.2));
        assert_eq!(s.region(), Region::Japan);
        assert_eq!(s.mechanism(), FaultMechanism::Reverse);
        assert_eq!(s.target_amplitude(), Some(1.1));
    }

    #[test]
    fn validate_rejects_bad_fields() {
        assert!(matches!(
            RuptureScenario::new(f64::NAN, 10.0, 400.0).validate(),
            Err(TargetError::InvalidScenario { field: "magnitude", .. })
        ));
        assert!(matches!(
            RuptureScenario::new(7.0, -1.0, 400.0).validate(),
            Err(TargetError::InvalidScenario { field: "distance_km", .. })
        ));
        assert!(matches!(
            RuptureScenario::new(7.0, 10.0, 0.0).validate(),
            Err(TargetError::InvalidScenario { field: "vs30", .. })
        ));
        assert!(matches!(
            RuptureScenario::new(7.0, 10.0, 400.0)
                .with_target_amplitude(-0.2)
                .validate(),
            Err(TargetError::InvalidAmplitude { .. })
        ));
    }
}
