use crate::record::RawRecord;
use crate::tail::error::TailError;
use crate::tail::file_id::FileId;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

type Opener = Box<dyn Fn(&Path) -> std::io::Result<File> + Send>;

/// Where reading begins when a file is first opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPosition {
    Start,
    End,
}

/// Where the tailer is in its rotation handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    /// Returning lines from the current handle.
    Streaming,
    /// The last read hit end-of-stream; the caller is expected to wait and retry.
    AwaitingRetry,
    /// A different file now lives at the path. The old handle is still read to
    /// its end; the switch happens on the next end-of-stream check.
    RotationPendingDrain,
}

/// Outcome of a single rotation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationCheck {
    Unchanged,
    /// The path could not be stat'ed. Treated as transient.
    StatFailed,
    /// Same file, smaller than before: reading restarted at offset 0.
    Truncated,
    /// A replacement file was seen for the first time.
    RenameDetected,
    /// The replacement file is now the open handle.
    Reopened,
    /// The replacement could not be opened; draining continues on the old handle.
    ReopenFailed,
}

/// Source of raw lines for a stream task.
pub trait Tailer: Send {
    fn path(&self) -> &Path;

    /// Next complete line, or `Ok(None)` when nothing is available yet.
    fn next_record(&mut self) -> Result<Option<RawRecord>, TailError>;

    fn close(&mut self);
}

/// Rotation-aware reader over one log path.
pub struct TailFile {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    identity: FileId,
    size: u64,
    state: TailState,
    /// Bytes of a line whose newline has not been written yet.
    partial: Vec<u8>,
    /// Opens the replacement file after a rename.
    opener: Opener,
}

impl TailFile {
    pub fn open(path: impl Into<PathBuf>, start: StartPosition) -> Result<Self, TailError> {
        let path = path.into();

        let mut file = File::open(&path).map_err(|e| TailError::open(&path, e))?;
        let metadata = file.metadata().map_err(|e| TailError::open(&path, e))?;

        if start == StartPosition::End {
            file.seek(SeekFrom::End(0))
                .map_err(|e| TailError::open(&path, e))?;
        }

        let identity = FileId::from_metadata(&metadata);
        debug!(
            path = %path.display(),
            file_id = %identity,
            size = metadata.len(),
            ?start,
            "opened log file"
        );

        Ok(Self {
            path,
            reader: Some(BufReader::new(file)),
            identity,
            size: metadata.len(),
            state: TailState::Streaming,
            partial: Vec::new(),
            opener: Box::new(|path: &Path| File::open(path)),
        })
    }

    pub fn state(&self) -> TailState {
        self.state
    }

    pub fn identity(&self) -> FileId {
        self.identity
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    /// Compare what is on disk at the path with the open handle and react.
    ///
    /// Stat failures never escalate: a path that briefly disappears mid-rotation
    /// must not stop the tailer.
    pub fn check_rotation(&mut self) -> RotationCheck {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "stat failed; will retry");
                return RotationCheck::StatFailed;
            }
        };

        let current = FileId::from_metadata(&metadata);
        let size = metadata.len();

        if current == self.identity {
            if self.state == TailState::RotationPendingDrain {
                // The original file came back before we switched.
                self.state = TailState::AwaitingRetry;
            }

            if size < self.size {
                return match self.rewind() {
                    Ok(()) => {
                        info!(
                            path = %self.path.display(),
                            previous_size = self.size,
                            current_size = size,
                            "file truncated; reading from start"
                        );
                        self.size = size;
                        RotationCheck::Truncated
                    }
                    Err(e) => {
                        debug!(path = %self.path.display(), error = %e, "rewind failed; will retry");
                        RotationCheck::Unchanged
                    }
                };
            }

            self.size = size;
            return RotationCheck::Unchanged;
        }

        if self.state != TailState::RotationPendingDrain {
            info!(
                path = %self.path.display(),
                old_file_id = %self.identity,
                new_file_id = %current,
                "file replaced; draining old file"
            );
            self.state = TailState::RotationPendingDrain;
            return RotationCheck::RenameDetected;
        }

        match self.reopen() {
            Ok(()) => RotationCheck::Reopened,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "reopen failed; will retry");
                RotationCheck::ReopenFailed
            }
        }
    }

    fn rewind(&mut self) -> std::io::Result<()> {
        if let Some(reader) = self.reader.as_mut() {
            // Seeking a BufReader discards its buffer.
            reader.seek(SeekFrom::Start(0))?;
        }
        self.partial.clear();
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn set_opener(
        &mut self,
        opener: impl Fn(&Path) -> std::io::Result<File> + Send + 'static,
    ) {
        self.opener = Box::new(opener);
    }

    fn reopen(&mut self) -> std::io::Result<()> {
        let file = (self.opener)(&self.path)?;
        let metadata = file.metadata()?;

        if !self.partial.is_empty() {
            debug!(
                path = %self.path.display(),
                bytes = self.partial.len(),
                "dropping unterminated line from rotated file"
            );
            self.partial.clear();
        }

        let identity = FileId::from_metadata(&metadata);
        info!(
            path = %self.path.display(),
            old_file_id = %self.identity,
            new_file_id = %identity,
            "rotated file drained; switched to new file"
        );

        // Dropping the old reader closes the old handle.
        self.reader = Some(BufReader::new(file));
        self.identity = identity;
        self.size = metadata.len();
        self.state = TailState::Streaming;
        Ok(())
    }
}

impl Tailer for TailFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn next_record(&mut self) -> Result<Option<RawRecord>, TailError> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(TailError::Closed {
                path: self.path.clone(),
            });
        };

        match reader.read_until(b'\n', &mut self.partial) {
            Ok(_) if self.partial.last() == Some(&b'\n') => {
                if self.state == TailState::AwaitingRetry {
                    self.state = TailState::Streaming;
                }
                Ok(Some(std::mem::take(&mut self.partial)))
            }
            Ok(_) => {
                // End of stream, possibly with an unterminated line kept in `partial`.
                self.check_rotation();
                if self.state == TailState::Streaming {
                    self.state = TailState::AwaitingRetry;
                }
                Ok(None)
            }
            Err(e) => Err(TailError::read(&self.path, e)),
        }
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!(path = %self.path.display(), "closed log file");
        }
    }
}
