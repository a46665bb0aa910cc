use chrono::{DateTime, Utc};

/// Bytes of one line as read from disk, newline included.
pub type RawRecord = Vec<u8>;

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub host: String,
    pub status_code: i64,
    /// Seconds.
    pub duration: f64,
}

impl Record {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
