//! The concurrent tailing pipeline.
//!
//! One stream task per file pushes raw lines onto a bounded queue. A single
//! aggregator task owns the [`SummaryTable`](crate::summary::SummaryTable) and
//! prints reports. [`run`] wires them together and handles shutdown.

mod aggregate;
mod constants;
mod error;
mod run;
mod shutdown;
mod stream;

pub use aggregate::{AggregateOutcome, Aggregator, ReportStyle};
pub use constants::EOF_RETRY_DELAY;
pub use error::PipelineError;
pub use run::{RunSummary, run};
pub use shutdown::{ShutdownHandle, ShutdownSignal, wait_for_signal};
pub use stream::{SendError, stream_file, stream_loop};
