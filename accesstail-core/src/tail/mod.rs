//! Rotation-aware tailing.
//!
//! A [`TailFile`] follows one path across truncation and rename-based rotation.
//! It never sleeps: when no complete line is available it checks for rotation and
//! returns `Ok(None)`, leaving the retry cadence to the caller.

mod error;
mod file_id;
mod tailer;

#[cfg(test)]
mod tests;

pub use error::TailError;
pub use file_id::FileId;
pub use tailer::{RotationCheck, StartPosition, TailFile, TailState, Tailer};
