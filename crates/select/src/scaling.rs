//! Scale-factor rules and bounds.

use gmsel_target::TargetStatistics;
use serde::{Deserialize, Serialize};

use crate::error::SelectError;

/// How a record's scale factor is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalingRule {
    /// Scale to the reference spectrum at one period: `ln s = y[index] − x[index]`.
    Conditioning {
        /// Grid index of the conditioning period.
        index: usize,
    },
    /// Least-squares fit in log space: `ln s = mean(y − x)`.
    LeastSquares,
}

/// Scaling configuration.
///
/// With scaling disabled every scale factor is exactly 1.
///
/// # Example
///
/// ```
/// use gmsel_select::{ScalingConfig, ScalingRule};
///
/// let scaling = ScalingConfig::new(4.0, ScalingRule::LeastSquares);
/// // record 1.0 below the reference everywhere: s = e, within [1/4, 4]
/// let ln_s = scaling.ln_scale(&[0.0, -1.0], &[1.0, 0.0]).unwrap();
/// assert_eq!(ln_s, 1.0);
/// assert_eq!(ScalingConfig::disabled().ln_scale(&[0.0], &[9.0]), Some(0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingConfig {
    enabled: bool,
    max_scale: f64,
    rule: ScalingRule,
}

impl ScalingConfig {
    /// Scaling enabled within `[1/max_scale, max_scale]`.
    pub fn new(max_scale: f64, rule: ScalingRule) -> Self {
        Self {
            enabled: true,
            max_scale,
            rule,
        }
    }

    /// Scaling disabled.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            max_scale: 1.0,
            rule: ScalingRule::LeastSquares,
        }
    }

    /// Scaling enabled with the rule suited to `target`: conditioning scaling
    /// at T* for a conditional target, least squares otherwise.
    pub fn for_target(target: &TargetStatistics, max_scale: f64) -> Self {
        let rule = match target.conditioning_index() {
            Some(index) if target.is_conditional() => ScalingRule::Conditioning { index },
            _ => ScalingRule::LeastSquares,
        };
        Self::new(max_scale, rule)
    }

    /// Returns whether scaling is enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the maximum scale factor.
    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    /// Returns the scaling rule.
    pub fn rule(&self) -> ScalingRule {
        self.rule
    }

    /// Validates the configuration for spectra of `n_periods` values.
    pub fn validate(&self, n_periods: usize) -> Result<(), SelectError> {
        if !self.enabled {
            return Ok(());
        }
        if !(self.max_scale.is_finite() && self.max_scale >= 1.0) {
            return Err(SelectError::InvalidMaxScale {
                max_scale: self.max_scale,
            });
        }
        if let ScalingRule::Conditioning { index } = self.rule
            && index >= n_periods
        {
            return Err(SelectError::ScalingIndexOutOfRange { index, n_periods });
        }
        Ok(())
    }

    /// Log scale factor bringing `record` onto `reference`.
    ///
    /// Returns `Some(0.0)` when disabled and `None` when the factor falls
    /// outside `[1/max_scale, max_scale]`.
    pub fn ln_scale(&self, record: &[f64], reference: &[f64]) -> Option<f64> {
        if !self.enabled {
            return Some(0.0);
        }
        let ln_s = match self.rule {
            ScalingRule::Conditioning { index } => reference[index] - record[index],
            ScalingRule::LeastSquares => {
                let n = record.len() as f64;
                record
                    .iter()
                    .zip(reference)
                    .map(|(x, y)| y - x)
                    .sum::<f64>()
                    / n
            }
        };
        let s = ln_s.exp();
        (s >= 1.0 / self.max_scale && s <= self.max_scale).then_some(ln_s)
    }
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self::disabled()
    }
}
