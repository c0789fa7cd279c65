//! Ordered period grid with an optional conditioning period.

use serde::Serialize;

use crate::error::TargetError;

/// Relative tolerance under which a conditioning period is considered
/// already present in the grid.
const PERIOD_MATCH_RTOL: f64 = 1e-9;

/// Strictly increasing spectral periods (seconds) shared by the target, the
/// simulated population and every candidate record.
///
/// # Example
///
/// ```
/// use gmsel_target::PeriodGrid;
///
/// let grid = PeriodGrid::log_spaced(0.1, 2.0, 10)
///     .unwrap()
///     .with_conditioning_period(0.5)
///     .unwrap();
///
/// assert_eq!(grid.len(), 11);
/// assert_eq!(grid.conditioning_period(), Some(0.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodGrid {
    periods: Vec<f64>,
    conditioning_index: Option<usize>,
}

impl PeriodGrid {
    /// Creates a grid from explicit periods.
    ///
    /// # Errors
    ///
    /// [`TargetError::EmptyGrid`] for no periods, [`TargetError::InvalidGrid`]
    /// for non-positive, non-finite or non-increasing periods.
    pub fn new(periods: Vec<f64>) -> Result<Self, TargetError> {
        if periods.is_empty() {
            return Err(TargetError::EmptyGrid);
        }
        if let Some(&p) = periods.iter().find(|p| !p.is_finite() || **p <= 0.0) {
            return Err(TargetError::InvalidGrid {
                reason: format!("period {p} is not finite and positive"),
            });
        }
        if let Some(w) = periods.windows(2).find(|w| w[1] <= w[0]) {
            return Err(TargetError::InvalidGrid {
                reason: format!("periods not strictly increasing at {} -> {}", w[0], w[1]),
            });
        }
        Ok(Self {
            periods,
            conditioning_index: None,
        })
    }

    /// Creates `n` logarithmically spaced periods from `t_min` to `t_max`
    /// inclusive. Endpoints are reproduced exactly.
    ///
    /// # Errors
    ///
    /// [`TargetError::InvalidGrid`] when `n == 0`, when bounds are not
    /// positive and finite, or when `t_min >= t_max` with `n > 1`.
    pub fn log_spaced(t_min: f64, t_max: f64, n: usize) -> Result<Self, TargetError> {
        if n == 0 {
            return Err(TargetError::EmptyGrid);
        }
        if !(t_min.is_finite() && t_max.is_finite() && t_min > 0.0 && t_max > 0.0) {
            return Err(TargetError::InvalidGrid {
                reason: format!("bounds [{t_min}, {t_max}] must be finite and positive"),
            });
        }
        if n == 1 {
            return Self::new(vec![t_min]);
        }
        if t_min >= t_max {
            return Err(TargetError::InvalidGrid {
                reason: format!("t_min {t_min} must be below t_max {t_max}"),
            });
        }
        let (a, b) = (t_min.ln(), t_max.ln());
        let step = (b - a) / (n - 1) as f64;
        let mut periods: Vec<f64> = (0..n).map(|k| (a + step * k as f64).exp()).collect();
        periods[0] = t_min;
        periods[n - 1] = t_max;
        Self::new(periods)
    }

    /// Marks `period` as the conditioning period, inserting it into the grid
    /// (in sorted position) when no existing period matches it.
    ///
    /// # Errors
    ///
    /// [`TargetError::InvalidGrid`] when `period` is not finite and positive.
    pub fn with_conditioning_period(mut self, period: f64) -> Result<Self, TargetError> {
        if !period.is_finite() || period <= 0.0 {
            return Err(TargetError::InvalidGrid {
                reason: format!("conditioning period {period} is not finite and positive"),
            });
        }
        let existing = self
            .periods
            .iter()
            .position(|&p| ((p - period) / period).abs() <= PERIOD_MATCH_RTOL);
        let index = match existing {
            Some(i) => i,
            None => {
                let i = self.periods.partition_point(|&p| p < period);
                self.periods.insert(i, period);
                i
            }
        };
        self.conditioning_index = Some(index);
        Ok(self)
    }

    /// Returns the periods (seconds).
    pub fn periods(&self) -> &[f64] {
        &self.periods
    }

    /// Returns the number of periods.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Returns `true` if the grid has no periods (never, once constructed).
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Returns the index of the conditioning period, if any.
    pub fn conditioning_index(&self) -> Option<usize> {
        self.conditioning_index
    }

    /// Returns the conditioning period (seconds), if any.
    pub fn conditioning_period(&self) -> Option<f64> {
        self.conditioning_index.map(|i| self.periods[i])
    }
}
