//! Ground-motion model seams and a tabulated implementation.

use serde::Serialize;

use crate::error::TargetError;
use crate::scenario::RuptureScenario;

/// Marginal log-normal prediction of spectral acceleration at one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// Mean of ln Sa (Sa in g).
    pub mean_ln: f64,
    /// Standard deviation of ln Sa.
    pub std_ln: f64,
}

/// A ground-motion prediction equation, treated as a black box.
pub trait GroundMotionModel {
    /// Predicts the log-normal distribution of Sa at `period` for `scenario`.
    fn predict(&self, period: f64, scenario: &RuptureScenario) -> Result<Prediction, TargetError>;

    /// Returns the inclusive range of periods (seconds) the model supports.
    fn period_range(&self) -> (f64, f64);
}

/// Correlation of ln Sa residuals between two periods.
pub trait CorrelationModel {
    /// Returns the correlation coefficient between `t_i` and `t_j`.
    fn correlation(&self, t_i: f64, t_j: f64) -> f64;
}

/// A ground-motion model pre-evaluated on a period table for one scenario.
///
/// Predictions between table periods are interpolated linearly in
/// `ln(period)`; the scenario argument is ignored.
#[derive(Debug, Clone, Serialize)]
pub struct TabulatedGmpe {
    periods: Vec<f64>,
    mean_ln: Vec<f64>,
    std_ln: Vec<f64>,
}

impl TabulatedGmpe {
    /// Creates a tabulated model.
    ///
    /// # Errors
    ///
    /// [`TargetError::InvalidTable`] on mismatched lengths, an empty table,
    /// non-increasing / non-positive periods, non-finite means or negative /
    /// non-finite standard deviations.
    pub fn new(periods: Vec<f64>, mean_ln: Vec<f64>, std_ln: Vec<f64>) -> Result<Self, TargetError> {
        if periods.is_empty() {
            return Err(TargetError::InvalidTable("table has no periods".into()));
        }
        if periods.len() != mean_ln.len() || periods.len() != std_ln.len() {
            return Err(TargetError::InvalidTable(format!(
                "length mismatch: {} periods, {} means, {} stds",
                periods.len(),
                mean_ln.len(),
                std_ln.len()
            )));
        }
        if periods.iter().any(|p| !p.is_finite() || *p <= 0.0)
            || periods.windows(2).any(|w| w[1] <= w[0])
        {
            return Err(TargetError::InvalidTable(
                "periods must be positive and strictly increasing".into(),
            ));
        }
        if mean_ln.iter().any(|m| !m.is_finite()) {
            return Err(TargetError::InvalidTable("non-finite mean".into()));
        }
        if std_ln.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(TargetError::InvalidTable(
                "standard deviations must be finite and non-negative".into(),
            ));
        }
        Ok(Self {
            periods,
            mean_ln,
            std_ln,
        })
    }

    /// Returns the table periods.
    pub fn periods(&self) -> &[f64] {
        &self.periods
    }
}

impl GroundMotionModel for TabulatedGmpe {
    fn predict(&self, period: f64, _scenario: &RuptureScenario) -> Result<Prediction, TargetError> {
        let (min, max) = self.period_range();
        let out_of_range = TargetError::PeriodOutOfRange { period, min, max };
        let mean_ln = gmsel_stats::interp_ln_period(&self.periods, &self.mean_ln, period)
            .ok_or_else(|| out_of_range.clone())?;
        let std_ln = gmsel_stats::interp_ln_period(&self.periods, &self.std_ln, period)
            .ok_or(out_of_range)?;
        Ok(Prediction { mean_ln, std_ln })
    }

    fn period_range(&self) -> (f64, f64) {
        (self.periods[0], self.periods[self.periods.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::scenario::{FaultMechanism, Region};

    fn scenario() -> RuptureScenario {
        RuptureScenario::new(7.0, 10.0, 400.0)
    }

    #[test]
    fn table_exact_and_interpolated() {
        let gmpe = TabulatedGmpe::new(vec![0.1, 1.0], vec![-1.0, -2.0], vec![0.6, 0.7]).unwrap();
        let p = gmpe.predict(1.0, &scenario()).unwrap();
        assert_eq!(p.mean_ln, -2.0);
        assert_eq!(p.std_ln, 0.7);

        let mid = gmpe.predict(0.1_f64.sqrt(), &scenario()).unwrap();
        assert_abs_diff_eq!(mid.mean_ln, -1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(mid.std_ln, 0.65, epsilon = 1e-12);
    }

    #[test]
    fn table_out_of_range() {
        let gmpe = TabulatedGmpe::new(vec![0.1, 1.0], vec![-1.0, -2.0], vec![0.6, 0.7]).unwrap();
        let err = gmpe.predict(3.0, &scenario()).unwrap_err();
        assert_eq!(
            err,
            TargetError::PeriodOutOfRange {
                period: 3.0,
                min: 0.1,
                max: 1.0
            }
        );
    }

    #[test]
    fn table_validation() {
        assert!(TabulatedGmpe::new(vec![], vec![], vec![]).is_err());
        assert!(TabulatedGmpe::new(vec![0.1, 0.2], vec![0.0], vec![0.5, 0.5]).is_err());
        assert!(TabulatedGmpe::new(vec![0.2, 0.1], vec![0.0, 0.0], vec![0.5, 0.5]).is_err());
        assert!(TabulatedGmpe::new(vec![0.1, 0.2], vec![0.0, 0.0], vec![0.5, -0.1]).is_err());
    }

    #[test]
    fn table_ignores_scenario() {
        let gmpe = TabulatedGmpe::new(vec![0.1, 1.0], vec![-1.0, -2.0], vec![0.6, 0.7]).unwrap();
        let a = RuptureScenario::new(5.5, 80.0, 760.0);
        let b = RuptureScenario::new(7.8, 2.0, 180.0)
            .with_region(Region::Japan)
            .with_mechanism(FaultMechanism::Reverse)
            .with_z2p5(3.0);
        assert_eq!(gmpe.predict(0.3, &a).unwrap(), gmpe.predict(0.3, &b).unwrap());
    }
}
