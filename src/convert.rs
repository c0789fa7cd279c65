//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Result, bail};

use crate::config::*;

use gmsel_io::{FlatfileConfig, Ordinate};
use gmsel_metric::{ErrorMetric, KsAggregate, Objective, Weights};
use gmsel_pool::RecordFilter;
use gmsel_select::{OptimizeConfig, ScalingConfig, ScalingRule};
use gmsel_simulate::SimulationConfig;
use gmsel_target::{
    Conditioning, FaultMechanism, PeriodGrid, Region, RuptureScenario, TargetConfig,
};

/// Parses a region name into the corresponding enum variant.
pub fn parse_region(s: &str) -> Result<Region> {
    match s.to_lowercase().as_str() {
        "global" => Ok(Region::Global),
        "california" => Ok(Region::California),
        "japan" => Ok(Region::Japan),
        "china-turkey" => Ok(Region::ChinaTurkey),
        "italy" => Ok(Region::Italy),
        other => bail!("unknown region: {other:?}"),
    }
}

/// Parses a faulting mechanism name into the corresponding enum variant.
pub fn parse_mechanism(s: &str) -> Result<FaultMechanism> {
    match s.to_lowercase().as_str() {
        "unspecified" => Ok(FaultMechanism::Unspecified),
        "strike-slip" => Ok(FaultMechanism::StrikeSlip),
        "normal" => Ok(FaultMechanism::Normal),
        "reverse" => Ok(FaultMechanism::Reverse),
        other => bail!("unknown fault mechanism: {other:?}"),
    }
}

/// Parses an objective name (`sse` or `ks`).
pub fn parse_objective(s: &str) -> Result<Objective> {
    match s.to_lowercase().as_str() {
        "sse" => Ok(Objective::Sse),
        "ks" => Ok(Objective::Ks),
        other => bail!("unknown objective: {other:?}"),
    }
}

/// Parses a KS aggregation name (`sum` or `max`).
pub fn parse_ks_aggregate(s: &str) -> Result<KsAggregate> {
    match s.to_lowercase().as_str() {
        "sum" => Ok(KsAggregate::Sum),
        "max" => Ok(KsAggregate::Max),
        other => bail!("unknown KS aggregate: {other:?}"),
    }
}

/// Builds and validates the rupture scenario.
pub fn build_scenario(scenario: &ScenarioToml) -> Result<RuptureScenario> {
    let mut s = RuptureScenario::new(scenario.magnitude, scenario.distance_km, scenario.vs30)
        .with_region(parse_region(&scenario.region)?)
        .with_mechanism(parse_mechanism(&scenario.mechanism)?);
    if let Some(z) = scenario.z2p5_km {
        s = s.with_z2p5(z);
    }
    if let Some(a) = scenario.target_amplitude {
        s = s.with_target_amplitude(a);
    }
    s.validate()?;
    Ok(s)
}

/// Builds the period grid, inserting T* when selection is conditional.
pub fn build_grid(periods: &PeriodsToml, selection: &SelectionToml) -> Result<PeriodGrid> {
    let grid = PeriodGrid::log_spaced(periods.t_min, periods.t_max, periods.n)?;
    if !selection.conditional {
        return Ok(grid);
    }
    match periods.conditioning {
        Some(t) => Ok(grid.with_conditioning_period(t)?),
        None => bail!("conditional selection requires [periods].conditioning"),
    }
}

/// Builds a [`TargetConfig`]; a scenario amplitude takes precedence over epsilon.
pub fn build_target_config(
    selection: &SelectionToml,
    scenario: &RuptureScenario,
) -> Result<TargetConfig> {
    let conditioning = if selection.conditional {
        Conditioning::for_scenario(scenario, selection.epsilon)
    } else {
        Conditioning::Unconditional
    };
    let cfg = TargetConfig::new()
        .with_conditioning(conditioning)
        .with_use_variance(selection.use_variance);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds the flatfile loader configuration.
pub fn build_flatfile_config(io: &IoConfig) -> FlatfileConfig {
    let ordinate = match &io.components {
        Some([a, b]) => Ordinate::GeometricMean(a.clone(), b.clone()),
        None => Ordinate::Single(io.ordinate.clone()),
    };
    FlatfileConfig::default().with_ordinate(ordinate)
}

/// Builds a [`RecordFilter`] from the TOML bounds.
pub fn build_filter(filter: &FilterToml) -> Result<RecordFilter> {
    let mut f = RecordFilter::new();
    if let Some([lo, hi]) = filter.magnitude {
        f = f.with_magnitude(lo, hi);
    }
    if let Some([lo, hi]) = filter.distance_km {
        f = f.with_distance(lo, hi);
    }
    if let Some([lo, hi]) = filter.vs30 {
        f = f.with_vs30(lo, hi);
    }
    f.validate()?;
    Ok(f)
}

/// Builds a [`SimulationConfig`]. A seed of 0 requests OS entropy.
pub fn build_simulation_config(
    selection: &SelectionToml,
    simulation: &SimulationToml,
    seed: Option<u64>,
) -> Result<SimulationConfig> {
    let cfg = SimulationConfig::new(selection.n_gm)
        .with_n_trials(simulation.n_trials)
        .with_correlation_weight(simulation.correlation_weight)
        .with_seed_opt(seed.filter(|&s| s != 0));
    cfg.validate()?;
    Ok(cfg)
}

/// Builds and validates an [`OptimizeConfig`] for `grid`.
///
/// A conditional selection scales records to the target at T*; otherwise
/// the least-squares rule applies.
pub fn build_optimize_config(
    optimize: &OptimizeToml,
    selection: &SelectionToml,
    grid: &PeriodGrid,
) -> Result<OptimizeConfig> {
    let [mean, std, skew] = optimize.weights;
    let metric = ErrorMetric::new()
        .with_weights(Weights::new(mean, std, skew))
        .with_objective(parse_objective(&optimize.objective)?)
        .with_ks_aggregate(parse_ks_aggregate(&optimize.ks_aggregate)?);
    let scaling = match (selection.scaling, grid.conditioning_index()) {
        (false, _) => ScalingConfig::disabled(),
        (true, Some(index)) if selection.conditional => {
            ScalingConfig::new(selection.max_scale, ScalingRule::Conditioning { index })
        }
        (true, _) => ScalingConfig::new(selection.max_scale, ScalingRule::LeastSquares),
    };
    let cfg = OptimizeConfig::new()
        .with_metric(metric)
        .with_scaling(scaling)
        .with_n_loop(optimize.n_loop)
        .with_penalty(optimize.penalty)
        .with_tol(optimize.tol)
        .with_parallel(optimize.parallel);
    cfg.validate(grid.len())?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!(parse_region("China-Turkey").unwrap(), Region::ChinaTurkey);
        assert_eq!(parse_mechanism("reverse").unwrap(), FaultMechanism::Reverse);
        assert_eq!(parse_objective("KS").unwrap(), Objective::Ks);
        assert_eq!(parse_ks_aggregate("max").unwrap(), KsAggregate::Max);
        assert!(parse_region("mars").is_err());
        assert!(parse_objective("rmse").is_err());
    }

    #[test]
    fn conditional_grid_requires_period() {
        let periods = PeriodsToml {
            t_min: 0.1,
            t_max: 2.0,
            n: 10,
            conditioning: None,
        };
        assert!(build_grid(&periods, &SelectionToml::default()).is_err());

        let unconditional = SelectionToml {
            conditional: false,
            ..SelectionToml::default()
        };
        let grid = build_grid(&periods, &unconditional).unwrap();
        assert_eq!(grid.len(), 10);
        assert!(grid.conditioning_index().is_none());
    }

    #[test]
    fn amplitude_overrides_epsilon() {
        let scenario = RuptureScenario::new(7.0, 10.0, 400.0).with_target_amplitude(0.4);
        let config = build_target_config(&SelectionToml::default(), &scenario).unwrap();
        assert_eq!(config.conditioning(), Conditioning::Amplitude(0.4));
    }

    #[test]
    fn flatfile_components() {
        let io = IoConfig {
            database: "db.json".into(),
            gmpe_table: "gmpe.json".into(),
            output: None,
            ordinate: "rotd50".into(),
            components: Some(["h1".into(), "h2".into()]),
        };
        assert_eq!(
            build_flatfile_config(&io).ordinate(),
            &Ordinate::GeometricMean("h1".into(), "h2".into())
        );
    }

    #[test]
    fn cli_seed_reaches_simulation() {
        let cfg = build_simulation_config(
            &SelectionToml::default(),
            &SimulationToml::default(),
            Some(9),
        )
        .unwrap();
        assert_eq!(cfg.seed(), Some(9));
        assert_eq!(cfg.n_gm(), 30);
    }

    #[test]
    fn zero_seed_is_unseeded() {
        let cfg = build_simulation_config(
            &SelectionToml::default(),
            &SimulationToml::default(),
            Some(0),
        )
        .unwrap();
        assert_eq!(cfg.seed(), None);
    }

    #[test]
    fn invalid_settings_rejected_by_builders() {
        let grid = PeriodGrid::log_spaced(0.1, 2.0, 5).unwrap();
        let negative_weight = OptimizeToml {
            weights: [1.0, -2.0, 0.3],
            ..OptimizeToml::default()
        };
        assert!(build_optimize_config(&negative_weight, &SelectionToml::default(), &grid).is_err());

        let small_scale = SelectionToml {
            max_scale: 0.5,
            ..SelectionToml::default()
        };
        assert!(build_optimize_config(&OptimizeToml::default(), &small_scale, &grid).is_err());

        let no_trials = SimulationToml {
            n_trials: 0,
            ..SimulationToml::default()
        };
        assert!(build_simulation_config(&SelectionToml::default(), &no_trials, None).is_err());

        let inverted = FilterToml {
            vs30: Some([800.0, 200.0]),
            ..FilterToml::default()
        };
        assert!(build_filter(&inverted).is_err());
    }

    #[test]
    fn conditional_scaling_uses_grid_index() {
        let grid = PeriodGrid::log_spaced(0.1, 2.0, 5)
            .unwrap()
            .with_conditioning_period(0.7)
            .unwrap();
        let k = grid.conditioning_index().unwrap();
        let cfg =
            build_optimize_config(&OptimizeToml::default(), &SelectionToml::default(), &grid).unwrap();
        assert_eq!(cfg.scaling().rule(), ScalingRule::Conditioning { index: k });

        let unconditional = SelectionToml {
            conditional: false,
            ..SelectionToml::default()
        };
        let cfg = build_optimize_config(&OptimizeToml::default(), &unconditional, &grid).unwrap();
        assert_eq!(cfg.scaling().rule(), ScalingRule::LeastSquares);
    }
}
