use crate::pipeline::constants::EOF_RETRY_DELAY;
use crate::pipeline::shutdown::ShutdownSignal;
use crate::record::RawRecord;
use crate::tail::{StartPosition, TailError, TailFile, Tailer};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    Cancelled,
    ChannelClosed,
}

/// Open `path` and stream its lines onto `tx` until cancelled or a fatal
/// read error occurs.
pub async fn stream_file(
    path: PathBuf,
    start: StartPosition,
    tx: mpsc::Sender<RawRecord>,
    signal: ShutdownSignal,
) -> Result<(), TailError> {
    let tailer = TailFile::open(path, start)?;
    stream_loop(tailer, tx, signal).await
}

/// Drive `tailer` until shutdown. The tailer is always closed on return.
pub async fn stream_loop<T: Tailer>(
    mut tailer: T,
    tx: mpsc::Sender<RawRecord>,
    mut signal: ShutdownSignal,
) -> Result<(), TailError> {
    let result = pump(&mut tailer, &tx, &mut signal).await;
    tailer.close();

    if let Err(e) = &result {
        debug!(path = %tailer.path().display(), error = %e, "stream stopped");
    }
    result
}

async fn pump<T: Tailer>(
    tailer: &mut T,
    tx: &mpsc::Sender<RawRecord>,
    signal: &mut ShutdownSignal,
) -> Result<(), TailError> {
    loop {
        if signal.is_cancelled() {
            debug!(path = %tailer.path().display(), "stream cancelled");
            return Ok(());
        }

        match tailer.next_record()? {
            Some(record) => match send_with_cancellation(tx, record, signal).await {
                Ok(()) => {}
                Err(SendError::Cancelled) => {
                    debug!(path = %tailer.path().display(), "send cancelled");
                    return Ok(());
                }
                Err(SendError::ChannelClosed) => {
                    debug!(path = %tailer.path().display(), "queue closed");
                    return Ok(());
                }
            },
            None => {
                tokio::select! {
                    _ = tokio::time::sleep(EOF_RETRY_DELAY) => {}
                    _ = signal.cancelled() => {}
                }
            }
        }
    }
}

async fn send_with_cancellation(
    tx: &mpsc::Sender<RawRecord>,
    record: RawRecord,
    signal: &mut ShutdownSignal,
) -> Result<(), SendError> {
    tokio::select! {
        result = tx.send(record) => result.map_err(|_| SendError::ChannelClosed),
        _ = signal.cancelled() => Err(SendError::Cancelled),
    }
}
