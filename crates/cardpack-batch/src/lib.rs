//! Selection handling and the sequential card-export batch runner.
//!
//! # Architecture
//!
//! - `selection.rs` - insertion-ordered set of roster ids chosen for export
//! - `progress.rs` - completed/total counter published over a watch channel
//! - `runner.rs` - one-shot batch: fetch each selected card in order, skip
//!   failures, package successes into an archive
//!
//! The runner is strictly sequential. One request in flight at a time keeps
//! the load on the authenticated backend bounded and makes progress
//! reporting deterministic.

pub use error::BatchError;
pub use progress::Progress;
pub use runner::{Batch, BatchOutcome, ExportPlan, ItemOutcome, StopFlag};
pub use selection::Selection;

mod error;
mod progress;
mod runner;
mod selection;
