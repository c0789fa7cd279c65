//! # gmsel-io
//!
//! Read record flatfiles and tabulated ground-motion models from JSON, and
//! write selection results back out. Bridges external files into the typed
//! values consumed by `gmsel-pool`, `gmsel-target` and `gmsel-select`.

mod error;
mod flatfile;
mod gmpe_table;
mod writer;

pub use error::IoError;
pub use flatfile::{FlatfileConfig, Ordinate, parse_flatfile, read_flatfile};
pub use gmpe_table::read_gmpe_table;
pub use writer::{SelectedRecord, SelectionOutput, write_json};
