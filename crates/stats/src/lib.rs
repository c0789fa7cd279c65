//! Statistical helper functions for gmsel.
//!
//! Moments follow the conventions used throughout the selection engine:
//! sample standard deviation with an N-1 denominator and the biased
//! (moment) skewness estimator.

use statrs::distribution::{ContinuousCDF, Normal};

/// Variance below which a sample is treated as constant.
const VARIANCE_FLOOR: f64 = 1e-24;

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Sample variance with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (nf - 1.0)
}

/// Sample standard deviation with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn sd(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Biased sample skewness `m3 / m2^(3/2)` using population central moments.
///
/// Returns 0.0 for fewer than 2 elements or a (numerically) constant sample,
/// so a deterministic column never contributes a skewness error.
pub fn skewness(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mu = mean(data);
    let (m2, m3) = data.iter().fold((0.0, 0.0), |(m2, m3), &x| {
        let d = x - mu;
        (m2 + d * d, m3 + d * d * d)
    });
    let m2 = m2 / nf;
    let m3 = m3 / nf;
    if m2 <= VARIANCE_FLOOR * mu.abs().max(1.0) {
        return 0.0;
    }
    m3 / m2.powf(1.5)
}

/// Pearson correlation coefficient.
///
/// Filters to indices where both `x[i]` and `y[i]` are finite.
/// Returns `None` if fewer than 3 finite pairs or if the denominator is zero
/// (constant input).
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter(|(xi, yi)| xi.is_finite() && yi.is_finite())
        .map(|(xi, yi)| (*xi, *yi))
        .collect();

    if pairs.len() < 3 {
        return None;
    }

    let n = pairs.len() as f64;
    let mx: f64 = pairs.iter().map(|(xi, _)| xi).sum::<f64>() / n;
    let my: f64 = pairs.iter().map(|(_, yi)| yi).sum::<f64>() / n;

    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;
    for &(xi, yi) in &pairs {
        let dx = xi - mx;
        let dy = yi - my;
        sum_xy += dx * dy;
        sum_xx += dx * dx;
        sum_yy += dy * dy;
    }

    let denom = (sum_xx * sum_yy).sqrt();
    if denom == 0.0 {
        return None;
    }

    Some(sum_xy / denom)
}

/// Normal CDF `Φ((x - mean) / sd)`.
///
/// A non-positive `sd` degenerates to the step function at `mean`
/// (`0` below, `1` at or above).
pub fn normal_cdf(x: f64, mean: f64, sd: f64) -> f64 {
    if !(sd > 0.0) {
        return if x >= mean { 1.0 } else { 0.0 };
    }
    match Normal::new(mean, sd) {
        Ok(dist) => dist.cdf(x),
        Err(_) => f64::NAN,
    }
}

/// Two-sided Kolmogorov–Smirnov statistic of `sample` against `N(mean, sd²)`.
///
/// `D = sup_x |F̂(x) − Φ(x)|`, evaluated on both sides of every jump of the
/// empirical CDF. Tied sample values are treated as a single jump. Returns
/// 0.0 for an empty sample.
pub fn ks_statistic(sample: &[f64], mean: f64, sd: f64) -> f64 {
    let n = sample.len();
    if n == 0 {
        return 0.0;
    }
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let nf = n as f64;
    let mut d_max: f64 = 0.0;
    let mut i = 0;
    while i < n {
        let x = sorted[i];
        let mut j = i;
        while j + 1 < n && sorted[j + 1] == x {
            j += 1;
        }
        let below = i as f64 / nf;
        let at = (j + 1) as f64 / nf;
        let cdf = normal_cdf(x, mean, sd);
        // Left limit of a step target at its jump is 0, not Φ(x).
        let cdf_left = if sd > 0.0 {
            cdf
        } else if x > mean {
            1.0
        } else {
            0.0
        };
        d_max = d_max.max((at - cdf).abs()).max((cdf_left - below).abs());
        i = j + 1;
    }
    d_max
}

/// Linear interpolation of `values` (sampled at strictly increasing `periods`)
/// in `ln(period)` at `period`.
///
/// Returns `None` when `period` lies outside `[periods[0], periods[last]]`
/// or the inputs are empty / mismatched.
pub fn interp_ln_period(periods: &[f64], values: &[f64], period: f64) -> Option<f64> {
    if periods.is_empty() || periods.len() != values.len() || !(period > 0.0) {
        return None;
    }
    let first = periods[0];
    let last = periods[periods.len() - 1];
    if period < first || period > last {
        return None;
    }
    // Exact hits avoid interpolation rounding.
    if let Some(k) = periods.iter().position(|&p| p == period) {
        return Some(values[k]);
    }
    let hi = periods.partition_point(|&p| p < period);
    let lo = hi - 1;
    let (x0, x1) = (periods[lo].ln(), periods[hi].ln());
    let w = (period.ln() - x0) / (x1 - x0);
    Some(values[lo] + w * (values[hi] - values[lo]))
}
