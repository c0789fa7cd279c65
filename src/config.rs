use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level gmsel configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GmselConfig {
    /// Global RNG seed; 0 or absent draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Rupture scenario.
    pub scenario: ScenarioToml,

    /// Target period grid.
    pub periods: PeriodsToml,

    /// Selection size, conditioning and scaling.
    #[serde(default)]
    pub selection: SelectionToml,

    /// Greedy optimizer settings.
    #[serde(default)]
    pub optimize: OptimizeToml,

    /// Target population simulation.
    #[serde(default)]
    pub simulation: SimulationToml,

    /// Candidate screening bounds.
    #[serde(default)]
    pub filter: FilterToml,

    /// Input and output paths.
    pub io: IoConfig,
}

/// Reads and parses a configuration file.
pub fn load(path: &Path) -> Result<GmselConfig> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}

/// Rupture scenario.
///
/// The shipped tabulated model ignores the scenario: its table already holds
/// the prediction for one scenario. Region, mechanism, basin depth,
/// magnitude and distance are validated and passed to the model but do not
/// change a tabulated target; only `target_amplitude` does.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioToml {
    pub magnitude: f64,
    pub distance_km: f64,
    pub vs30: f64,
    #[serde(default)]
    pub z2p5_km: Option<f64>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_mechanism")]
    pub mechanism: String,
    /// Spectral amplitude (g) at the conditioning period; overrides epsilon.
    #[serde(default)]
    pub target_amplitude: Option<f64>,
}

fn default_region() -> String {
    "global".to_string()
}
fn default_mechanism() -> String {
    "unspecified".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeriodsToml {
    #[serde(default = "default_t_min")]
    pub t_min: f64,
    #[serde(default = "default_t_max")]
    pub t_max: f64,
    #[serde(default = "default_n_periods")]
    pub n: usize,
    /// Conditioning period T*, inserted into the grid when absent.
    #[serde(default)]
    pub conditioning: Option<f64>,
}

fn default_t_min() -> f64 {
    0.05
}
fn default_t_max() -> f64 {
    5.0
}
fn default_n_periods() -> usize {
    30
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionToml {
    #[serde(default = "default_n_gm")]
    pub n_gm: usize,
    #[serde(default = "default_true")]
    pub conditional: bool,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default = "default_true")]
    pub use_variance: bool,
    #[serde(default = "default_true")]
    pub scaling: bool,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
}

impl Default for SelectionToml {
    fn default() -> Self {
        Self {
            n_gm: default_n_gm(),
            conditional: true,
            epsilon: default_epsilon(),
            use_variance: true,
            scaling: true,
            max_scale: default_max_scale(),
        }
    }
}

fn default_n_gm() -> usize {
    30
}
fn default_true() -> bool {
    true
}
fn default_epsilon() -> f64 {
    1.0
}
fn default_max_scale() -> f64 {
    4.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizeToml {
    #[serde(default = "default_objective")]
    pub objective: String,
    #[serde(default = "default_ks_aggregate")]
    pub ks_aggregate: String,
    /// Weights on mean, standard deviation and skewness errors.
    #[serde(default = "default_weights")]
    pub weights: [f64; 3],
    #[serde(default)]
    pub penalty: f64,
    #[serde(default = "default_tol")]
    pub tol: f64,
    #[serde(default = "default_n_loop")]
    pub n_loop: usize,
    #[serde(default)]
    pub parallel: bool,
}

impl Default for OptimizeToml {
    fn default() -> Self {
        Self {
            objective: default_objective(),
            ks_aggregate: default_ks_aggregate(),
            weights: default_weights(),
            penalty: 0.0,
            tol: default_tol(),
            n_loop: default_n_loop(),
            parallel: false,
        }
    }
}

fn default_objective() -> String {
    "sse".to_string()
}
fn default_ks_aggregate() -> String {
    "sum".to_string()
}
fn default_weights() -> [f64; 3] {
    [1.0, 2.0, 0.3]
}
fn default_tol() -> f64 {
    10.0
}
fn default_n_loop() -> usize {
    2
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationToml {
    #[serde(default = "default_n_trials")]
    pub n_trials: usize,
    /// Weight of the correlation mismatch when ranking trials.
    #[serde(default = "default_correlation_weight")]
    pub correlation_weight: f64,
}

impl Default for SimulationToml {
    fn default() -> Self {
        Self {
            n_trials: default_n_trials(),
            correlation_weight: default_correlation_weight(),
        }
    }
}

fn default_n_trials() -> usize {
    20
}
fn default_correlation_weight() -> f64 {
    1.0
}

/// Closed `[min, max]` bounds; absent bounds do not screen.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FilterToml {
    #[serde(default)]
    pub magnitude: Option<[f64; 2]>,
    #[serde(default)]
    pub distance_km: Option<[f64; 2]>,
    #[serde(default)]
    pub vs30: Option<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoConfig {
    /// Record flatfile (JSON).
    pub database: PathBuf,
    /// Tabulated ground-motion model (JSON).
    pub gmpe_table: PathBuf,
    pub output: Option<PathBuf>,
    /// Spectra column read from the flatfile.
    #[serde(default = "default_ordinate")]
    pub ordinate: String,
    /// Two component columns combined by geometric mean; overrides `ordinate`.
    #[serde(default)]
    pub components: Option<[String; 2]>,
}

fn default_ordinate() -> String {
    "rotd50".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [scenario]
        magnitude = 7.0
        distance_km = 10.0
        vs30 = 400.0

        [periods]
        conditioning = 1.0

        [io]
        database = "flatfile.json"
        gmpe_table = "gmpe.json"
    "#;

    #[test]
    fn minimal_config_takes_defaults() {
        let config: GmselConfig = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.seed, None);
        assert_eq!(config.selection.n_gm, 30);
        assert!(config.selection.conditional);
        assert_eq!(config.optimize.weights, [1.0, 2.0, 0.3]);
        assert_eq!(config.optimize.objective, "sse");
        assert_eq!(config.simulation.n_trials, 20);
        assert_eq!(config.simulation.correlation_weight, 1.0);
        assert!(config.filter.vs30.is_none());
        assert_eq!(config.io.ordinate, "rotd50");
    }

    #[test]
    fn unknown_field_rejected() {
        let text = format!("{MINIMAL}\n[optimize]\nbogus = 1\n");
        assert!(toml::from_str::<GmselConfig>(&text).is_err());
    }

    #[test]
    fn full_config_parses() {
        let text = r#"
            seed = 42

            [scenario]
            magnitude = 6.5
            distance_km = 20.0
            vs30 = 760.0
            z2p5_km = 1.2
            region = "california"
            mechanism = "strike-slip"

            [periods]
            t_min = 0.1
            t_max = 3.0
            n = 15
            conditioning = 0.5

            [selection]
            n_gm = 10
            max_scale = 5.0

            [optimize]
            objective = "ks"
            ks_aggregate = "max"
            penalty = 2.0
            parallel = true

            [filter]
            magnitude = [6.0, 7.5]
            vs30 = [300.0, 1000.0]

            [io]
            database = "db.json"
            gmpe_table = "gmpe.json"
            output = "out/selection.json"
            components = ["h1", "h2"]
        "#;
        let config: GmselConfig = toml::from_str(text).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.periods.n, 15);
        assert_eq!(config.filter.magnitude, Some([6.0, 7.5]));
        assert!(config.optimize.parallel);
        assert_eq!(config.io.components.as_ref().unwrap()[1], "h2");
    }
}
