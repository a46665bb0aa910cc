//! Access log records.
//!
//! One line of the tailed file is one JSON object. Only four fields matter to the
//! summary (`time`, `host`, `status_code`, `duration`); anything else on the line
//! is ignored.

mod error;
mod parse;
mod types;

pub use error::RecordError;
pub use parse::decode;
pub use types::{RawRecord, Record};
