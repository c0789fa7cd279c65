//! Baker & Jayaram (2008) inter-period correlation of ln Sa residuals.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::model::CorrelationModel;

/// Period (s) separating the short-period branch of the model.
const T_SPLIT: f64 = 0.109;

/// Baker & Jayaram (2008) correlation model, valid for 0.01–10 s.
///
/// Equal periods return exactly 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct BakerJayaram2008;

impl BakerJayaram2008 {
    /// Evaluates the model for two periods (seconds).
    pub fn rho(t1: f64, t2: f64) -> f64 {
        if t1 == t2 {
            return 1.0;
        }
        let t_min = t1.min(t2);
        let t_max = t1.max(t2);

        let c1 = 1.0 - (FRAC_PI_2 - 0.366 * (t_max / t_min.max(T_SPLIT)).ln()).cos();
        let c2 = if t_max < 0.2 {
            1.0 - 0.105
                * (1.0 - 1.0 / (1.0 + (100.0 * t_max - 5.0).exp()))
                * ((t_max - t_min) / (t_max - 0.0099))
        } else {
            0.0
        };
        let c3 = if t_max < T_SPLIT { c2 } else { c1 };
        let c4 = c1 + 0.5 * (c3.sqrt() - c3) * (1.0 + (PI * t_min / T_SPLIT).cos());

        let rho = if t_max < T_SPLIT {
            c2
        } else if t_min > T_SPLIT {
            c1
        } else if t_max < 0.2 {
            c2.min(c4)
        } else {
            c4
        };
        rho.clamp(-1.0, 1.0)
    }
}

impl CorrelationModel for BakerJayaram2008 {
    fn correlation(&self, t_i: f64, t_j: f64) -> f64 {
        Self::rho(t_i, t_j)
    }
}
