//! Target response-spectrum distributions for ground-motion selection.
//!
//! Given a rupture scenario and a ground-motion model, builds the mean,
//! standard deviation and covariance of ln Sa on a period grid. The target is
//! either the marginal prediction or the conditional spectrum at a reference
//! period T*:
//!
//! | Quantity | Conditional form |
//! |----------|------------------|
//! | mean | `μᵢ + ρ(tᵢ, T*) · ε · σᵢ` |
//! | covariance | `σᵢσⱼ(ρᵢⱼ − ρᵢ*ρⱼ*)` |
//! | epsilon from amplitude | `(ln a − μ*) / σ*` |
//!
//! # Quick start
//!
//! ```
//! use gmsel_target::{
//!     BakerJayaram2008, Conditioning, PeriodGrid, RuptureScenario, TabulatedGmpe,
//!     TargetConfig, compute_target,
//! };
//!
//! let gmpe = TabulatedGmpe::new(
//!     vec![0.05, 0.5, 5.0],
//!     vec![-1.0, -1.2, -3.0],
//!     vec![0.6, 0.65, 0.7],
//! )
//! .unwrap();
//! let grid = PeriodGrid::log_spaced(0.1, 2.0, 10)
//!     .unwrap()
//!     .with_conditioning_period(0.5)
//!     .unwrap();
//! let scenario = RuptureScenario::new(7.0, 15.0, 400.0);
//! let config = TargetConfig::new().with_conditioning(Conditioning::Epsilon(1.0));
//!
//! let target = compute_target(&grid, &scenario, &gmpe, &BakerJayaram2008, &config).unwrap();
//! assert_eq!(target.len(), 11);
//! assert_eq!(target.std()[grid.conditioning_index().unwrap()], 0.0);
//! ```
//!
//! # Architecture
//!
//! ```text
//! compute_target()
//!   ├─ RuptureScenario::validate()      (scenario.rs)
//!   ├─ GroundMotionModel::predict()     (model.rs, per period)
//!   ├─ CorrelationModel::correlation()  (correlation.rs, per pair)
//!   ├─ back_compute_epsilon()           (amplitude conditioning)
//!   └─ conditional mean / covariance    (target.rs)
//! ```

pub mod correlation;
pub mod error;
pub mod grid;
pub mod model;
pub mod scenario;
pub mod target;

pub use correlation::BakerJayaram2008;
pub use error::TargetError;
pub use grid::PeriodGrid;
pub use model::{CorrelationModel, GroundMotionModel, Prediction, TabulatedGmpe};
pub use scenario::{FaultMechanism, Region, RuptureScenario};
pub use target::{Conditioning, TargetConfig, TargetStatistics, back_compute_epsilon, compute_target};
