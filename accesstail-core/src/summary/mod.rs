//! Per-host running statistics.
//!
//! The table is owned by a single task (the aggregator) and is never shared, so it
//! carries no synchronisation of its own.

mod render;
mod table;

pub use render::{COLUMNS, TITLE};
pub use table::{HostSummary, SummaryTable};
