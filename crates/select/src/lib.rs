//! Ground-motion record selection against a target spectrum distribution.
//!
//! Records are chosen in two stages. The initial matcher assigns each
//! simulated spectrum its nearest unused pool record; the greedy optimiser
//! then swaps records position by position while the aggregate error drops.
//!
//! | Stage | Objective | Scale reference |
//! |-------|-----------|-----------------|
//! | [`match_initial`] | `Σ (ln s + x − y)²` per simulated spectrum | simulated spectrum |
//! | [`optimize`] | [`ErrorMetric`](gmsel_metric::ErrorMetric) (+ outlier penalty) | target mean |
//!
//! # Quick start
//!
//! ```
//! use gmsel_pool::{CandidatePool, RecordMetadata};
//! use gmsel_select::{OptimizeConfig, select_records};
//! use gmsel_simulate::SimulationConfig;
//! use gmsel_target::{PeriodGrid, TargetStatistics};
//!
//! let grid = PeriodGrid::new(vec![0.2, 1.0]).unwrap();
//! let target =
//!     TargetStatistics::from_moments(&grid, vec![0.0, -1.0], vec![0.3, 0.1, 0.1, 0.3]).unwrap();
//! let spectra: Vec<f64> = (0..40).flat_map(|i| {
//!     let z = (i as f64 - 19.5) / 10.0;
//!     [z, -1.0 + 0.8 * z]
//! }).collect();
//! let meta = (0..40).map(|i| RecordMetadata::new(format!("r{i}"), 6.5, 10.0, 400.0)).collect();
//! let pool = CandidatePool::new(2, spectra, meta).unwrap();
//!
//! let run = select_records(
//!     &target,
//!     &pool,
//!     &SimulationConfig::new(8).with_seed(1),
//!     &OptimizeConfig::new().with_tol(0.0),
//! )
//! .unwrap();
//! assert_eq!(run.selection().len(), 8);
//! ```
//!
//! # Architecture
//!
//! ```text
//! select_records()                 (pipeline.rs)
//!   ├─ simulate()                  (gmsel-simulate)
//!   ├─ match_initial()             (matcher.rs)
//!   │    └─ ScalingConfig::ln_scale()   (scaling.rs)
//!   └─ optimize()                  (optimizer.rs)
//!        ├─ early exit on stage-one percent error (SSE only)
//!        └─ n_loop × n_gm × |pool| candidate evaluations (serial or rayon)
//! ```

pub mod error;
pub mod matcher;
pub mod optimizer;
pub mod pipeline;
pub mod scaling;
pub mod selection;

pub use error::SelectError;
pub use matcher::match_initial;
pub use optimizer::{OptimizeConfig, OptimizeOutcome, metric_for_target, optimize};
pub use pipeline::{SelectionRun, select_records};
pub use scaling::{ScalingConfig, ScalingRule};
pub use selection::{Selection, SelectionReport};
