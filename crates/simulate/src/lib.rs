//! Synthetic log-spectra consistent with a target distribution.
//!
//! Draws `n_gm` samples from `N(μ, Σ)` per trial and keeps the trial whose
//! empirical moments best match the target. The retained population is a
//! statistical scaffold for record matching, not a set of realisable spectra.
//!
//! # Quick start
//!
//! ```
//! use gmsel_metric::ErrorMetric;
//! use gmsel_simulate::{SimulationConfig, simulate};
//! use gmsel_target::{PeriodGrid, TargetStatistics};
//!
//! let grid = PeriodGrid::new(vec![0.2, 1.0]).unwrap();
//! let target =
//!     TargetStatistics::from_moments(&grid, vec![-1.0, -2.0], vec![0.3, 0.1, 0.1, 0.4]).unwrap();
//! let config = SimulationConfig::new(20).with_n_trials(10).with_seed(42);
//!
//! let population = simulate(&target, &config, &ErrorMetric::new()).unwrap();
//! assert_eq!(population.len(), 20);
//! ```
//!
//! # Architecture
//!
//! ```text
//! simulate()
//!   ├─ MvnSampler::new()          (mvn.rs: Cholesky, jitter, fallback)
//!   └─ per trial
//!        ├─ sample_into() × n_gm
//!        ├─ SSE of moments        (gmsel-metric)
//!        └─ correlation_error()   (optional)
//! ```

pub mod config;
pub mod error;
pub mod mvn;
pub mod population;

mod simulate;

pub use config::SimulationConfig;
pub use error::SimulateError;
pub use mvn::MvnSampler;
pub use population::SimulatedPopulation;
pub use simulate::{correlation_error, simulate, trial_error};
