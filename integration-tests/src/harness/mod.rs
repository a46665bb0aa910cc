pub mod logfile;
pub mod pipeline;
pub mod tracing;

pub use logfile::{LogFile, access_line};
pub use pipeline::{Finished, SharedBuf, TestPipeline};
pub use tracing::{CapturedEvent, events_for_path, init_test_tracing};
