//! Aggregate error metrics between a set of log-spectra and a target.
//!
//! Two interchangeable objectives:
//!
//! | Objective | Per-period term | Aggregate |
//! |-----------|-----------------|-----------|
//! | SSE | `w_m(m̂−μ)² + w_s(ŝ−σ)² + w_γ γ̂²` | sum |
//! | KS | `sup |F̂(x) − Φ((x−μ)/σ)|` | sum or max |
//!
//! Sample standard deviations use N−1; skewness is the biased moment
//! estimator. With an excluded period (the conditioning period), only the
//! mean term is scored there.
//!
//! # Quick start
//!
//! ```
//! use gmsel_metric::ErrorMetric;
//! use gmsel_target::{PeriodGrid, TargetStatistics};
//!
//! let grid = PeriodGrid::new(vec![0.2, 1.0]).unwrap();
//! let target =
//!     TargetStatistics::from_moments(&grid, vec![0.0, -1.0], vec![1.0, 0.0, 0.0, 1.0]).unwrap();
//! // two spectra, row-major
//! let rows = [1.0, 0.0, -1.0, -2.0];
//! let error = ErrorMetric::new().score(&rows, &target).unwrap();
//! assert!(error > 0.0);
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod sample;

mod score;

pub use config::{ErrorMetric, KsAggregate, Objective, Weights};
pub use error::MetricError;
pub use report::{PercentErrors, STD_FLOOR};
pub use sample::{MetricScratch, SampleStats};
