use std::time::Duration;

/// Delay before polling a quiescent file again.
pub const EOF_RETRY_DELAY: Duration = Duration::from_millis(100);
