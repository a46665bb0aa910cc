use crate::record::error::RecordError;
use crate::record::types::Record;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Seconds since the Unix epoch of `0001-01-01T00:00:00Z`, the instant producers
/// emit when they have no timestamp to write.
const ZERO_INSTANT_SECS: i64 = -62_135_596_800;

/// Wire shape of a line. Every field defaults so that absent and zero values
/// take the same validation path.
#[derive(Deserialize)]
struct WireRecord {
    #[serde(default)]
    time: Option<DateTime<Utc>>,
    /// Fallback key for producers that do not write `time`.
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    host: String,
    #[serde(default)]
    status_code: i64,
    #[serde(default)]
    duration: f64,
}

/// Decode one raw line into a [`Record`].
///
/// Zero values count as missing: a `status_code` of 0 or a `duration` of 0.0 is
/// rejected exactly like an absent field.
pub fn decode(raw: &[u8]) -> Result<Record, RecordError> {
    let wire: WireRecord = serde_json::from_slice(raw)?;

    let timestamp = match wire.time.or(wire.timestamp) {
        Some(ts) if !is_zero_instant(&ts) => ts,
        _ => return Err(RecordError::missing("time")),
    };
    if wire.host.is_empty() {
        return Err(RecordError::missing("host"));
    }
    if wire.status_code == 0 {
        return Err(RecordError::missing("status_code"));
    }
    if wire.duration == 0.0 {
        return Err(RecordError::missing("duration"));
    }

    Ok(Record {
        timestamp,
        host: wire.host,
        status_code: wire.status_code,
        duration: wire.duration,
    })
}

fn is_zero_instant(ts: &DateTime<Utc>) -> bool {
    ts.timestamp() == ZERO_INSTANT_SECS && ts.timestamp_subsec_nanos() == 0
}
