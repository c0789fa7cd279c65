//! Candidate record pools for ground-motion selection.
//!
//! A [`SpectraDatabase`] holds records on their native period lists. Screening
//! with a [`RecordFilter`] and interpolating onto the target grid yields the
//! read-only [`CandidatePool`] the selector works from.
//!
//! ```
//! use gmsel_pool::{CandidatePool, RecordFilter, RecordMetadata, RecordSpectrum, SpectraDatabase};
//!
//! let db = SpectraDatabase::new(vec![RecordSpectrum::new(
//!     RecordMetadata::new("rsn6", 6.9, 12.0, 220.0),
//!     vec![0.01, 10.0],
//!     vec![-1.0, -5.0],
//! )])
//! .unwrap();
//! let pool = CandidatePool::from_database(&db, &[0.1, 1.0], &RecordFilter::new()).unwrap();
//! assert_eq!(pool.len(), 1);
//! ```

pub mod database;
pub mod error;
pub mod filter;
pub mod pool;
pub mod record;

pub use database::{RecordSpectrum, SpectraDatabase};
pub use error::PoolError;
pub use filter::RecordFilter;
pub use pool::CandidatePool;
pub use record::{CandidateRecord, RecordMetadata};
