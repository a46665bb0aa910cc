mod error;

pub use error::ConfigError;

use crate::tail::StartPosition;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Queue slots reserved per tailed file.
const QUEUE_SLOTS_PER_FILE: usize = 25;
const MIN_QUEUE_CAPACITY: usize = 100;
const MAX_QUEUE_CAPACITY: usize = 10_000;

/// Validated settings for one tailing run.
#[derive(Debug, Clone)]
pub struct TailConfig {
    pub files: Vec<PathBuf>,
    pub from_start: bool,
    pub interval: Duration,
}

impl TailConfig {
    pub fn new(
        files: Vec<PathBuf>,
        from_start: bool,
        interval: Duration,
    ) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Err(ConfigError::NoFiles);
        }

        let mut seen = HashSet::new();
        for file in &files {
            if !seen.insert(file) {
                return Err(ConfigError::DuplicateFile { path: file.clone() });
            }
        }

        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(Self {
            files,
            from_start,
            interval,
        })
    }

    pub fn start_position(&self) -> StartPosition {
        if self.from_start {
            StartPosition::Start
        } else {
            StartPosition::End
        }
    }

    /// Capacity of the shared record queue: 25 slots per file, kept within
    /// 100..=10_000.
    pub fn queue_capacity(&self) -> usize {
        (self.files.len() * QUEUE_SLOTS_PER_FILE).clamp(MIN_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY)
    }
}
