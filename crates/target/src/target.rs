//! Target mean / covariance construction, with optional conditioning.

use nalgebra::DMatrix;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::TargetError;
use crate::grid::PeriodGrid;
use crate::model::{CorrelationModel, GroundMotionModel, Prediction};
use crate::scenario::RuptureScenario;

/// Relative tolerance on covariance asymmetry accepted by
/// [`TargetStatistics::from_moments`].
const SYMMETRY_RTOL: f64 = 1e-12;

/// How the target distribution is conditioned at the reference period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Conditioning {
    /// Marginal predictions at every period.
    #[default]
    Unconditional,
    /// Condition on a fixed number of standard deviations at T*.
    Epsilon(f64),
    /// Condition on a spectral amplitude (g) at T*; epsilon is back-computed.
    Amplitude(f64),
}

impl Conditioning {
    /// Conditions on the scenario's target amplitude when present, otherwise
    /// on `epsilon`.
    pub fn for_scenario(scenario: &RuptureScenario, epsilon: f64) -> Self {
        match scenario.target_amplitude() {
            Some(a) => Self::Amplitude(a),
            None => Self::Epsilon(epsilon),
        }
    }

    /// Returns `true` unless unconditional.
    pub fn is_conditional(&self) -> bool {
        !matches!(self, Self::Unconditional)
    }
}

/// Configuration for [`compute_target`].
///
/// # Example
///
/// ```
/// use gmsel_target::{Conditioning, TargetConfig};
///
/// let config = TargetConfig::new()
///     .with_conditioning(Conditioning::Epsilon(1.5))
///     .with_use_variance(false);
/// assert!(!config.use_variance());
/// ```
#[derive(Debug, Clone)]
pub struct TargetConfig {
    conditioning: Conditioning,
    use_variance: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetConfig {
    /// Creates a configuration with defaults.
    ///
    /// Defaults: unconditional, `use_variance = true`.
    pub fn new() -> Self {
        Self {
            conditioning: Conditioning::Unconditional,
            use_variance: true,
        }
    }

    /// Sets the conditioning mode.
    pub fn with_conditioning(mut self, conditioning: Conditioning) -> Self {
        self.conditioning = conditioning;
        self
    }

    /// When `false`, every target variance and covariance is forced to zero.
    pub fn with_use_variance(mut self, use_variance: bool) -> Self {
        self.use_variance = use_variance;
        self
    }

    /// Returns the conditioning mode.
    pub fn conditioning(&self) -> Conditioning {
        self.conditioning
    }

    /// Returns whether the target carries variance.
    pub fn use_variance(&self) -> bool {
        self.use_variance
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// [`TargetError::InvalidEpsilon`] for a non-finite epsilon and
    /// [`TargetError::InvalidAmplitude`] for a non-positive or non-finite
    /// amplitude.
    pub fn validate(&self) -> Result<(), TargetError> {
        match self.conditioning {
            Conditioning::Unconditional => Ok(()),
            Conditioning::Epsilon(epsilon) if !epsilon.is_finite() => {
                Err(TargetError::InvalidEpsilon { epsilon })
            }
            Conditioning::Amplitude(amplitude) if !(amplitude.is_finite() && amplitude > 0.0) => {
                Err(TargetError::InvalidAmplitude { amplitude })
            }
            _ => Ok(()),
        }
    }
}

/// Target distribution of log spectral acceleration on a period grid.
///
/// The covariance is stored row-major and is exactly symmetric with a
/// non-negative diagonal equal to `std²`.
#[derive(Debug, Clone, Serialize)]
pub struct TargetStatistics {
    periods: Vec<f64>,
    mean: Vec<f64>,
    std: Vec<f64>,
    covariance: Vec<f64>,
    marginal_mean: Vec<f64>,
    marginal_std: Vec<f64>,
    conditioning_index: Option<usize>,
    epsilon: Option<f64>,
}

impl TargetStatistics {
    /// Builds target statistics directly from a mean and a row-major covariance.
    ///
    /// The marginal statistics are taken to be the supplied ones and the
    /// result is unconditional: any conditioning period on `grid` is ignored.
    /// Off-diagonal pairs may differ by rounding (relative to the largest
    /// entry); the upper triangle is mirrored into the lower.
    ///
    /// # Errors
    ///
    /// [`TargetError::InvalidGrid`] on dimension mismatch, a non-finite entry,
    /// an asymmetric matrix or a negative diagonal.
    pub fn from_moments(
        grid: &PeriodGrid,
        mean: Vec<f64>,
        mut covariance: Vec<f64>,
    ) -> Result<Self, TargetError> {
        let n = grid.len();
        if mean.len() != n || covariance.len() != n * n {
            return Err(TargetError::InvalidGrid {
                reason: format!(
                    "expected {n} means and {} covariance entries, got {} and {}",
                    n * n,
                    mean.len(),
                    covariance.len()
                ),
            });
        }
        if mean.iter().chain(&covariance).any(|v| !v.is_finite()) {
            return Err(TargetError::InvalidGrid {
                reason: "non-finite target moment".into(),
            });
        }
        let scale = covariance.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        let tol = SYMMETRY_RTOL * scale;
        for i in 0..n {
            if covariance[i * n + i] < 0.0 {
                return Err(TargetError::InvalidGrid {
                    reason: format!("negative variance at index {i}"),
                });
            }
            for j in (i + 1)..n {
                let upper = covariance[i * n + j];
                if (upper - covariance[j * n + i]).abs() > tol {
                    return Err(TargetError::InvalidGrid {
                        reason: format!("covariance not symmetric at ({i}, {j})"),
                    });
                }
                covariance[j * n + i] = upper;
            }
        }
        let std: Vec<f64> = (0..n).map(|i| covariance[i * n + i].sqrt()).collect();
        Ok(Self {
            periods: grid.periods().to_vec(),
            marginal_mean: mean.clone(),
            marginal_std: std.clone(),
            mean,
            std,
            covariance,
            conditioning_index: None,
            epsilon: None,
        })
    }

    /// Returns the periods (seconds).
    pub fn periods(&self) -> &[f64] {
        &self.periods
    }

    /// Returns the number of periods.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Returns `true` if there are no periods.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Returns the target mean of ln Sa.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Returns the target standard deviation of ln Sa.
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Returns the covariance as a flat row-major slice.
    pub fn covariance_flat(&self) -> &[f64] {
        &self.covariance
    }

    /// Returns the covariance between periods `i` and `j`.
    pub fn covariance(&self, i: usize, j: usize) -> f64 {
        self.covariance[i * self.periods.len() + j]
    }

    /// Returns the correlation between periods `i` and `j`.
    ///
    /// Periods with zero target variance are uncorrelated with everything
    /// except themselves.
    pub fn correlation(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 1.0;
        }
        let denom = self.std[i] * self.std[j];
        if denom > 0.0 {
            (self.covariance(i, j) / denom).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Returns the covariance as a dense matrix.
    pub fn covariance_matrix(&self) -> DMatrix<f64> {
        let n = self.periods.len();
        DMatrix::from_row_slice(n, n, &self.covariance)
    }

    /// Returns the unconditional mean of ln Sa.
    pub fn marginal_mean(&self) -> &[f64] {
        &self.marginal_mean
    }

    /// Returns the unconditional standard deviation of ln Sa.
    pub fn marginal_std(&self) -> &[f64] {
        &self.marginal_std
    }

    /// Returns the reference period index when the target is conditional.
    pub fn conditioning_index(&self) -> Option<usize> {
        self.conditioning_index
    }

    /// Returns the epsilon used for conditioning, if any.
    pub fn epsilon(&self) -> Option<f64> {
        self.epsilon
    }

    /// Returns `true` if the target was conditioned at a reference period.
    pub fn is_conditional(&self) -> bool {
        self.epsilon.is_some()
    }
}

/// Back-computes epsilon from a target amplitude at the reference period.
///
/// `ε = (ln a − μ*) / σ*`.
///
/// # Errors
///
/// [`TargetError::InvalidAmplitude`] if `amplitude` is not finite and positive,
/// [`TargetError::InvalidEpsilon`] if `std_ref` is not positive.
pub fn back_compute_epsilon(mean_ref: f64, std_ref: f64, amplitude: f64) -> Result<f64, TargetError> {
    if !(amplitude.is_finite() && amplitude > 0.0) {
        return Err(TargetError::InvalidAmplitude { amplitude });
    }
    let epsilon = (amplitude.ln() - mean_ref) / std_ref;
    if !(std_ref > 0.0) || !epsilon.is_finite() {
        return Err(TargetError::InvalidEpsilon { epsilon });
    }
    Ok(epsilon)
}

/// Computes the target distribution for `scenario` on `grid`.
///
/// Conditional modes require `grid` to carry a conditioning index. The
/// conditional covariance is `σᵢσⱼ(ρᵢⱼ − ρᵢ*ρⱼ*)`, clamped to a non-negative
/// diagonal and mirrored from the upper triangle.
///
/// # Errors
///
/// Returns [`TargetError`] for an invalid scenario or configuration, periods
/// outside the model range, a missing conditioning period, or a non-finite
/// model prediction.
#[tracing::instrument(skip(grid, scenario, gmpe, correlation, config), fields(n_periods = grid.len()))]
pub fn compute_target(
    grid: &PeriodGrid,
    scenario: &RuptureScenario,
    gmpe: &dyn GroundMotionModel,
    correlation: &dyn CorrelationModel,
    config: &TargetConfig,
) -> Result<TargetStatistics, TargetError> {
    scenario.validate()?;
    config.validate()?;
    if grid.is_empty() {
        return Err(TargetError::EmptyGrid);
    }

    let (min, max) = gmpe.period_range();
    let periods = grid.periods();
    let n = periods.len();

    let mut marginal_mean = Vec::with_capacity(n);
    let mut marginal_std = Vec::with_capacity(n);
    for &period in periods {
        if period < min || period > max {
            return Err(TargetError::PeriodOutOfRange { period, min, max });
        }
        let Prediction { mean_ln, std_ln } = gmpe.predict(period, scenario)?;
        if !mean_ln.is_finite() {
            return Err(TargetError::NonFinitePrediction {
                quantity: "mean",
                period,
            });
        }
        if !(std_ln.is_finite() && std_ln >= 0.0) {
            return Err(TargetError::NonFinitePrediction {
                quantity: "std",
                period,
            });
        }
        marginal_mean.push(mean_ln);
        marginal_std.push(std_ln);
    }

    let mut rho = vec![0.0; n * n];
    for i in 0..n {
        rho[i * n + i] = 1.0;
        for j in (i + 1)..n {
            let r = correlation.correlation(periods[i], periods[j]);
            if !r.is_finite() {
                return Err(TargetError::NonFinitePrediction {
                    quantity: "correlation",
                    period: periods[j],
                });
            }
            let r = r.clamp(-1.0, 1.0);
            rho[i * n + j] = r;
            rho[j * n + i] = r;
        }
    }

    let (conditioning_index, epsilon) = match config.conditioning() {
        Conditioning::Unconditional => (None, None),
        conditioning => {
            let k = grid
                .conditioning_index()
                .ok_or(TargetError::MissingConditioningPeriod)?;
            let epsilon = match conditioning {
                Conditioning::Amplitude(a) => back_compute_epsilon(marginal_mean[k], marginal_std[k], a)?,
                Conditioning::Epsilon(e) => e,
                Conditioning::Unconditional => 0.0,
            };
            debug!(conditioning_period = periods[k], epsilon, "conditioning target");
            (Some(k), Some(epsilon))
        }
    };

    let mean: Vec<f64> = match (conditioning_index, epsilon) {
        (Some(k), Some(eps)) => (0..n)
            .map(|i| marginal_mean[i] + rho[i * n + k] * eps * marginal_std[i])
            .collect(),
        _ => marginal_mean.clone(),
    };

    let mut covariance = vec![0.0; n * n];
    if config.use_variance() {
        for i in 0..n {
            for j in i..n {
                let r = match conditioning_index {
                    Some(k) => rho[i * n + j] - rho[i * n + k] * rho[j * n + k],
                    None => rho[i * n + j],
                };
                let mut c = marginal_std[i] * marginal_std[j] * r;
                if i == j {
                    c = c.max(0.0);
                }
                covariance[i * n + j] = c;
                covariance[j * n + i] = c;
            }
        }
    }
    let std: Vec<f64> = (0..n).map(|i| covariance[i * n + i].sqrt()).collect();

    info!(
        n_periods = n,
        conditional = conditioning_index.is_some(),
        use_variance = config.use_variance(),
        "target statistics computed"
    );

    Ok(TargetStatistics {
        periods: periods.to_vec(),
        mean,
        std,
        covariance,
        marginal_mean,
        marginal_std,
        conditioning_index,
        epsilon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::BakerJayaram2008;
    use crate::model::TabulatedGmpe;
    use approx::assert_abs_diff_eq;

    fn gmpe() -> TabulatedGmpe {
        TabulatedGmpe::new(
            vec![0.05, 0.1, 0.5, 1.0, 3.0],
            vec![-0.9, -0.6, -0.8, -1.5, -2.8],
            vec![0.55, 0.6, 0.62, 0.66, 0.7],
        )
        .unwrap()
    }

    fn grid() -> PeriodGrid {
        PeriodGrid::log_spaced(0.1, 2.0, 6)
            .unwrap()
            .with_conditioning_period(0.5)
            .unwrap()
    }

    fn scenario() -> RuptureScenario {
        RuptureScenario::new(6.5, 20.0, 400.0)
    }

    #[test]
    fn unconditional_matches_marginals() {
        let t = compute_target(&grid(), &scenario(), &gmpe(), &BakerJayaram2008, &TargetConfig::new()).unwrap();
        assert_eq!(t.mean(), t.marginal_mean());
        for i in 0..t.len() {
            assert_abs_diff_eq!(t.std()[i], t.marginal_std()[i], epsilon = 1e-12);
        }
        assert!(!t.is_conditional());
        assert_eq!(t.conditioning_index(), None);
    }

    #[test]
    fn conditional_reference_has_zero_variance() {
        let config = TargetConfig::new().with_conditioning(Conditioning::Epsilon(2.0));
        let t = compute_target(&grid(), &scenario(), &gmpe(), &BakerJayaram2008, &config).unwrap();
        let k = t.conditioning_index().unwrap();
        assert_eq!(t.covariance(k, k), 0.0);
        assert_eq!(t.std()[k], 0.0);
        assert_abs_diff_eq!(
            t.mean()[k],
            t.marginal_mean()[k] + 2.0 * t.marginal_std()[k],
            epsilon = 1e-12
        );
        for i in 0..t.len() {
            assert!(t.std()[i] <= t.marginal_std()[i] + 1e-12);
        }
    }

    #[test]
    fn missing_conditioning_period() {
        let grid = PeriodGrid::log_spaced(0.1, 2.0, 6).unwrap();
        let config = TargetConfig::new().with_conditioning(Conditioning::Epsilon(1.0));
        let err = compute_target(&grid, &scenario(), &gmpe(), &BakerJayaram2008, &config).unwrap_err();
        assert_eq!(err, TargetError::MissingConditioningPeriod);
    }

    #[test]
    fn out_of_range_period() {
        let grid = PeriodGrid::log_spaced(0.1, 5.0, 4).unwrap();
        let err = compute_target(&grid, &scenario(), &gmpe(), &BakerJayaram2008, &TargetConfig::new()).unwrap_err();
        assert!(matches!(err, TargetError::PeriodOutOfRange { period, .. } if period == 5.0));
    }

    #[test]
    fn invalid_amplitude_rejected() {
        let config = TargetConfig::new().with_conditioning(Conditioning::Amplitude(0.0));
        assert_eq!(
            config.validate().unwrap_err(),
            TargetError::InvalidAmplitude { amplitude: 0.0 }
        );
    }

    #[test]
    fn back_compute_epsilon_known_value() {
        let eps = back_compute_epsilon(-1.0, 0.5, 1.0).unwrap();
        assert_abs_diff_eq!(eps, 2.0, epsilon = 1e-12);
        assert!(back_compute_epsilon(-1.0, 0.0, 1.0).is_err());
        assert!(back_compute_epsilon(-1.0, 0.5, -1.0).is_err());
    }

    #[test]
    fn for_scenario_prefers_amplitude() {
        let s = scenario().with_target_amplitude(0.4);
        assert_eq!(Conditioning::for_scenario(&s, 1.0), Conditioning::Amplitude(0.4));
        assert_eq!(Conditioning::for_scenario(&scenario(), 1.0), Conditioning::Epsilon(1.0));
    }

    #[test]
    fn from_moments_rejects_asymmetry() {
        let grid = PeriodGrid::new(vec![0.1, 1.0]).unwrap();
        let err = TargetStatistics::from_moments(&grid, vec![0.0, 0.0], vec![1.0, 0.2, 0.3, 1.0]);
        assert!(err.is_err());
        let ok = TargetStatistics::from_moments(&grid, vec![0.0, 0.0], vec![1.0, 0.2, 0.2, 4.0]).unwrap();
        assert_eq!(ok.std(), &[1.0, 2.0]);
        assert_abs_diff_eq!(ok.correlation(0, 1), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn from_moments_mirrors_rounding_asymmetry() {
        let sd = [0.61, 0.63, 0.66, 0.7];
        let grid = PeriodGrid::new(vec![0.1, 0.3, 1.0, 3.0]).unwrap();
        let n = sd.len();
        // rho * sd[i] * sd[j] is not bit-symmetric in (i, j)
        let cov: Vec<f64> = (0..n * n)
            .map(|k| {
                let (i, j) = (k / n, k % n);
                let rho = if i == j { 1.0 } else { 0.37 };
                rho * sd[i] * sd[j]
            })
            .collect();
        let t = TargetStatistics::from_moments(&grid, vec![0.0; n], cov).unwrap();
        for i in 0..n {
            for j in 0..n {
                assert_eq!(t.covariance(i, j), t.covariance(j, i));
            }
        }
    }

    #[test]
    fn from_moments_is_unconditional() {
        let grid = PeriodGrid::new(vec![0.1, 1.0])
            .unwrap()
            .with_conditioning_period(1.0)
            .unwrap();
        assert_eq!(grid.conditioning_index(), Some(1));
        let t = TargetStatistics::from_moments(&grid, vec![0.0, 0.0], vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        assert!(!t.is_conditional());
        assert_eq!(t.conditioning_index(), None);
    }
}
