//! Multivariate-normal sampler over the positive-variance periods.

use gmsel_target::TargetStatistics;
use nalgebra::{Cholesky, DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, warn};

/// Diagonal jitter multipliers (relative to the mean active variance).
const JITTER_STEPS: [f64; 5] = [1e-10, 1e-9, 1e-8, 1e-7, 1e-6];

/// Draws log-spectra from `N(mean, covariance)`.
///
/// Periods with zero target variance are copied from the mean. If the
/// covariance of the remaining periods cannot be factorised even with jitter,
/// every period is copied from the mean.
#[derive(Debug, Clone)]
pub struct MvnSampler {
    mean: Vec<f64>,
    active: Vec<usize>,
    factor: Option<DMatrix<f64>>,
    jitter: f64,
    degraded: bool,
}

impl MvnSampler {
    /// Factorises the target covariance restricted to positive-variance periods.
    pub fn new(target: &TargetStatistics) -> Self {
        let n = target.len();
        let active: Vec<usize> = (0..n).filter(|&i| target.covariance(i, i) > 0.0).collect();
        let mut sampler = Self {
            mean: target.mean().to_vec(),
            active,
            factor: None,
            jitter: 0.0,
            degraded: false,
        };
        if sampler.active.is_empty() {
            debug!("target has no variance; sampling is deterministic");
            return sampler;
        }

        let m = sampler.active.len();
        let cov = DMatrix::from_fn(m, m, |r, c| {
            target.covariance(sampler.active[r], sampler.active[c])
        });
        if let Some(chol) = Cholesky::new(cov.clone()) {
            sampler.factor = Some(chol.l());
            return sampler;
        }

        let scale = cov.diagonal().mean();
        for eps in JITTER_STEPS {
            let jitter = eps * scale;
            let jittered = &cov + DMatrix::identity(m, m) * jitter;
            if let Some(chol) = Cholesky::new(jittered) {
                debug!(jitter, "covariance factorised with diagonal jitter");
                sampler.factor = Some(chol.l());
                sampler.jitter = jitter;
                return sampler;
            }
        }

        warn!(
            n_active = m,
            "covariance not positive definite after jitter; replicating the mean"
        );
        sampler.active.clear();
        sampler.degraded = true;
        sampler
    }

    /// Returns `true` when every draw equals the mean.
    pub fn is_deterministic(&self) -> bool {
        self.factor.is_none()
    }

    /// Returns `true` when factorisation failed and sampling fell back to the mean.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Returns the diagonal jitter added before factorisation.
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Returns the number of periods.
    pub fn n_periods(&self) -> usize {
        self.mean.len()
    }

    /// Writes one draw into `out` (length = number of periods).
    pub fn sample_into<R: Rng>(&self, rng: &mut R, out: &mut [f64]) {
        out.copy_from_slice(&self.mean);
        let Some(l) = &self.factor else {
            return;
        };
        let z = DVector::from_fn(self.active.len(), |_, _| rng.sample::<f64, _>(StandardNormal));
        let lz = l * z;
        for (k, &p) in self.active.iter().enumerate() {
            out[p] += lz[k];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use gmsel_target::PeriodGrid;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn target(cov: Vec<f64>) -> TargetStatistics {
        let grid = PeriodGrid::new(vec![0.1, 0.5, 1.0]).unwrap();
        TargetStatistics::from_moments(&grid, vec![-1.0, -2.0, -3.0], cov).unwrap()
    }

    #[test]
    fn zero_variance_periods_copied_exactly() {
        let t = target(vec![
            0.25, 0.0, 0.1, //
            0.0, 0.0, 0.0, //
            0.1, 0.0, 0.36,
        ]);
        let sampler = MvnSampler::new(&t);
        assert!(!sampler.is_deterministic());
        let mut rng = StdRng::seed_from_u64(1);
        let mut out = [0.0; 3];
        for _ in 0..20 {
            sampler.sample_into(&mut rng, &mut out);
            assert_eq!(out[1], -2.0);
        }
    }

    #[test]
    fn all_zero_is_deterministic() {
        let sampler = MvnSampler::new(&target(vec![0.0; 9]));
        assert!(sampler.is_deterministic());
        assert!(!sampler.is_degraded());
        let mut out = [0.0; 3];
        sampler.sample_into(&mut StdRng::seed_from_u64(0), &mut out);
        assert_eq!(out, [-1.0, -2.0, -3.0]);
    }

    #[test]
    fn singular_covariance_recovered_with_jitter() {
        // perfectly correlated: rank one
        let t = target(vec![
            0.25, 0.25, 0.25, //
            0.25, 0.25, 0.25, //
            0.25, 0.25, 0.25,
        ]);
        let sampler = MvnSampler::new(&t);
        assert!(!sampler.is_deterministic());
        assert!(sampler.jitter() > 0.0);
        let mut out = [0.0; 3];
        sampler.sample_into(&mut StdRng::seed_from_u64(3), &mut out);
        assert_abs_diff_eq!(out[0] + 1.0, out[1] + 2.0, epsilon = 1e-3);
    }

    #[test]
    fn indefinite_covariance_degrades_to_mean() {
        let t = target(vec![
            1.0, 2.0, 0.0, //
            2.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ]);
        let sampler = MvnSampler::new(&t);
        assert!(sampler.is_degraded());
        assert!(sampler.is_deterministic());
        let mut out = [0.0; 3];
        sampler.sample_into(&mut StdRng::seed_from_u64(0), &mut out);
        assert_eq!(out, [-1.0, -2.0, -3.0]);
    }

    #[test]
    fn sample_moments_converge() {
        let t = target(vec![
            0.25, 0.1, 0.0, //
            0.1, 0.16, 0.0, //
            0.0, 0.0, 0.09,
        ]);
        let sampler = MvnSampler::new(&t);
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let mut rows = vec![0.0; n * 3];
        for row in rows.chunks_exact_mut(3) {
            sampler.sample_into(&mut rng, row);
        }
        let col = |p: usize| -> Vec<f64> { rows.chunks_exact(3).map(|r| r[p]).collect() };
        assert_abs_diff_eq!(gmsel_stats::mean(&col(0)), -1.0, epsilon = 0.02);
        assert_abs_diff_eq!(gmsel_stats::sd(&col(1)), 0.4, epsilon = 0.02);
        let r01 = gmsel_stats::pearson_correlation(&col(0), &col(1)).unwrap();
        assert_abs_diff_eq!(r01, 0.1 / (0.5 * 0.4), epsilon = 0.03);
    }
}
