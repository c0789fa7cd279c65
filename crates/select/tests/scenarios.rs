//! End-to-end selections on a conditional-spectrum target.

use approx::assert_abs_diff_eq;
use gmsel_metric::ErrorMetric;
use gmsel_pool::{CandidatePool, RecordMetadata};
use gmsel_select::{OptimizeConfig, ScalingConfig, SelectionRun, metric_for_target, select_records};
use gmsel_simulate::{SimulationConfig, simulate};
use gmsel_target::{
    BakerJayaram2008, Conditioning, PeriodGrid, RuptureScenario, TabulatedGmpe, TargetConfig,
    TargetStatistics, compute_target,
};

const N_GM: usize = 5;
const N_POOL: usize = 50;

fn target(use_variance: bool) -> TargetStatistics {
    let gmpe = TabulatedGmpe::new(
        vec![0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 3.0],
        vec![-1.2, -0.8, -0.6, -0.9, -1.6, -2.4, -2.9],
        vec![0.58, 0.6, 0.61, 0.63, 0.66, 0.69, 0.7],
    )
    .unwrap();
    let grid = PeriodGrid::log_spaced(0.1, 2.0, 10)
        .unwrap()
        .with_conditioning_period(0.5)
        .unwrap();
    let config = TargetConfig::new()
        .with_conditioning(Conditioning::Epsilon(1.0))
        .with_use_variance(use_variance);
    compute_target(
        &grid,
        &RuptureScenario::new(7.0, 10.0, 400.0),
        &gmpe,
        &BakerJayaram2008,
        &config,
    )
    .unwrap()
}

/// Record log-spectra drawn from the conditional target; exact at T*.
fn conditional_records(t: &TargetStatistics) -> Vec<f64> {
    let metric = metric_for_target(&ErrorMetric::new(), t);
    let config = SimulationConfig::new(N_POOL).with_n_trials(1).with_seed(2024);
    simulate(t, &config, &metric).unwrap().rows().to_vec()
}

fn pool_from(spectra: Vec<f64>, n_periods: usize) -> CandidatePool {
    let meta = (0..spectra.len() / n_periods)
        .map(|i| RecordMetadata::new(format!("rsn{i}"), 7.0, 10.0, 400.0).with_original_index(1000 + i))
        .collect();
    CandidatePool::new(n_periods, spectra, meta).unwrap()
}

fn run(t: &TargetStatistics, pool: &CandidatePool, scaling: ScalingConfig) -> SelectionRun {
    let simulation = SimulationConfig::new(N_GM).with_n_trials(20).with_seed(7);
    let config = OptimizeConfig::new()
        .with_scaling(scaling)
        .with_n_loop(2)
        .with_tol(0.0);
    select_records(t, pool, &simulation, &config).unwrap()
}

fn assert_unique(indices: &[usize]) {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), indices.len(), "duplicate records in {indices:?}");
}

/// Pool exact at T*, no scaling: unique records, zero mean error at T*.
#[test]
fn exact_pool_without_scaling() {
    let t = target(true);
    let k = t.conditioning_index().unwrap();
    let pool = pool_from(conditional_records(&t), t.len());
    for i in 0..pool.len() {
        assert_eq!(pool.spectrum(i)[k], t.mean()[k]);
    }

    let out = run(&t, &pool, ScalingConfig::disabled());
    let selection = out.selection();
    assert_eq!(selection.len(), N_GM);
    assert_unique(selection.indices());
    assert!(selection.scale_factors().iter().all(|&s| s == 1.0));
    assert_abs_diff_eq!(out.outcome().final_report().percent().mean()[k], 0.0, epsilon = 1e-9);
    assert_eq!(out.outcome().final_report().percent().std()[k], None);
    for &orig in &selection.original_indices(&pool) {
        assert!((1000..1000 + N_POOL).contains(&orig));
    }
}

/// Records recorded at shifted amplitudes: scaling stays in bounds and beats
/// the unscaled selection from the same pool.
#[test]
fn shifted_pool_with_scaling() {
    let t = target(true);
    let n = t.len();
    let shifted: Vec<f64> = conditional_records(&t)
        .chunks_exact(n)
        .enumerate()
        .flat_map(|(r, row)| {
            let offset = 1.0 + 0.3 * r as f64 / (N_POOL - 1) as f64;
            row.iter().map(move |x| x + offset)
        })
        .collect();
    let pool = pool_from(shifted, n);

    let unscaled = run(&t, &pool, ScalingConfig::disabled());
    let scaled = run(&t, &pool, ScalingConfig::for_target(&t, 4.0));

    let selection = scaled.selection();
    assert_unique(selection.indices());
    for s in selection.scale_factors() {
        assert!((0.25..=4.0).contains(&s), "scale factor {s} out of bounds");
    }
    assert!(
        scaled.outcome().final_report().error() < unscaled.outcome().final_report().error(),
        "scaled {} !< unscaled {}",
        scaled.outcome().final_report().error(),
        unscaled.outcome().final_report().error()
    );
}

/// Without variance the simulated population is the target mean.
#[test]
fn deterministic_target() {
    let t = target(false);
    let pool = pool_from(conditional_records(&target(true)), t.len());
    let out = run(&t, &pool, ScalingConfig::disabled());
    assert!(out.population().is_deterministic());
    for spectrum in out.population().iter() {
        assert_eq!(spectrum, t.mean());
    }
    assert_unique(out.selection().indices());
}
