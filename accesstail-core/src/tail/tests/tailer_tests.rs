use crate::tail::{RotationCheck, StartPosition, TailError, TailFile, TailState, Tailer};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::tempdir;

fn append(path: &Path, content: &str) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

fn next_line(tailer: &mut TailFile) -> Option<String> {
    tailer
        .next_record()
        .unwrap()
        .map(|raw| String::from_utf8(raw).unwrap())
}

#[test]
fn reads_existing_lines_from_start() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("access.log");
    fs::write(&path, "line1\nline2\nline3\n").unwrap();

    // Act
    let mut tailer = TailFile::open(&path, StartPosition::Start).unwrap();

    // Assert
    assert_eq!(next_line(&mut tailer).as_deref(), Some("line1\n"));
    assert_eq!(next_line(&mut tailer).as_deref(), Some("line2\n"));
    assert_eq!(next_line(&mut tailer).as_deref(), Some("line3\n"));
    assert_eq!(next_line(&mut tailer), None);
    assert_eq!(tailer.state(), TailState::AwaitingRetry);
}

#[test]
fn starting_at_end_skips_existing_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("access.log");
    fs::write(&path, "old1\nold2\n").unwrap();

    let mut tailer = TailFile::open(&path, StartPosition::End).unwrap();
    assert_eq!(next_line(&mut tailer), None);

    append(&path, "fresh\n");

    assert_eq!(next_line(&mut tailer).as_deref(), Some("fresh\n"));
    assert_eq!(tailer.state(), TailState::Streaming);
}

#[test]
fn unterminated_line_is_held_until_completed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("access.log");
    fs::write(&path, "{\"host\":").unwrap();

    let mut tailer = TailFile::open(&path, StartPosition::Start).unwrap();
    assert_eq!(next_line(&mut tailer), None);
    assert_eq!(next_line(&mut tailer), None);

    append(&path, "\"a.com\"}\n");

    assert_eq!(
        next_line(&mut tailer).as_deref(),
        Some("{\"host\":\"a.com\"}\n")
    );
}

#[test]
fn truncation_restarts_from_offset_zero() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("access.log");
    fs::write(&path, "line1\nline2\nline3\n").unwrap();

    let mut tailer = TailFile::open(&path, StartPosition::Start).unwrap();
    let identity = tailer.identity();
    for _ in 0..3 {
        assert!(next_line(&mut tailer).is_some());
    }
    assert_eq!(next_line(&mut tailer), None);

    // Act: rewrite in place, shorter than before.
    fs::write(&path, "new1\n").unwrap();

    // Assert: the end-of-stream check rewinds, the next read sees the new content.
    assert_eq!(next_line(&mut tailer), None);
    assert_eq!(next_line(&mut tailer).as_deref(), Some("new1\n"));
    assert_eq!(next_line(&mut tailer), None);
    assert_eq!(tailer.identity(), identity);
}

#[test]
fn truncation_is_reported_by_rotation_check() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("access.log");
    fs::write(&path, "line1\nline2\n").unwrap();

    let mut tailer = TailFile::open(&path, StartPosition::End).unwrap();
    assert_eq!(tailer.check_rotation(), RotationCheck::Unchanged);

    fs::write(&path, "").unwrap();
    assert_eq!(tailer.check_rotation(), RotationCheck::Truncated);

    // Growing again afterwards is just growth.
    append(&path, "line3\n");
    assert_eq!(tailer.check_rotation(), RotationCheck::Unchanged);
    assert_eq!(next_line(&mut tailer).as_deref(), Some("line3\n"));
}

#[test]
fn rename_drains_old_file_before_switching() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("access.log");
    let rotated = dir.path().join("access.log.1");
    fs::write(&path, "old1\nold2\n").unwrap();

    let mut tailer = TailFile::open(&path, StartPosition::Start).unwrap();
    assert_eq!(next_line(&mut tailer).as_deref(), Some("old1\n"));

    // Act: rotate, then keep writing to the renamed file.
    fs::rename(&path, &rotated).unwrap();
    fs::write(&path, "new1\n").unwrap();
    append(&rotated, "old3\n");

    // Assert: everything left in the old file comes first.
    assert_eq!(next_line(&mut tailer).as_deref(), Some("old2\n"));
    assert_eq!(next_line(&mut tailer).as_deref(), Some("old3\n"));

    // First end-of-stream only notices the replacement.
    assert_eq!(next_line(&mut tailer), None);
    assert_eq!(tailer.state(), TailState::RotationPendingDrain);

    // Late writes to the old file are still picked up.
    append(&rotated, "old4\n");
    assert_eq!(next_line(&mut tailer).as_deref(), Some("old4\n"));
    assert_eq!(tailer.state(), TailState::RotationPendingDrain);

    // Second end-of-stream switches over.
    assert_eq!(next_line(&mut tailer), None);
    assert_ne!(tailer.state(), TailState::RotationPendingDrain);
    assert_eq!(next_line(&mut tailer).as_deref(), Some("new1\n"));
    assert_eq!(tailer.state(), TailState::Streaming);
}

#[test]
fn rename_switch_needs_two_checks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("access.log");
    fs::write(&path, "old\n").unwrap();

    let mut tailer = TailFile::open(&path, StartPosition::End).unwrap();
    let old_identity = tailer.identity();

    fs::rename(&path, dir.path().join("access.log.1")).unwrap();
    fs::write(&path, "new\n").unwrap();

    assert_eq!(tailer.check_rotation(), RotationCheck::RenameDetected);
    assert_eq!(tailer.identity(), old_identity);

    assert_eq!(tailer.check_rotation(), RotationCheck::Reopened);
    assert_ne!(tailer.identity(), old_identity);

    // The replacement is read from its first byte.
    assert_eq!(next_line(&mut tailer).as_deref(), Some("new\n"));
}

#[test]
fn failed_reopen_keeps_draining_and_retries() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("access.log");
    let rotated = dir.path().join("access.log.1");
    fs::write(&path, "old1\n").unwrap();

    let mut tailer = TailFile::open(&path, StartPosition::Start).unwrap();
    let old_identity = tailer.identity();
    assert_eq!(next_line(&mut tailer).as_deref(), Some("old1\n"));

    let refuse = Arc::new(AtomicBool::new(true));
    tailer.set_opener({
        let refuse = Arc::clone(&refuse);
        move |path| {
            if refuse.load(Ordering::SeqCst) {
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
            } else {
                File::open(path)
            }
        }
    });

    fs::rename(&path, &rotated).unwrap();
    fs::write(&path, "new1\n").unwrap();
    assert_eq!(tailer.check_rotation(), RotationCheck::RenameDetected);

    // Act
    append(&rotated, "old2\n");
    let failed = tailer.check_rotation();

    // Assert
    assert_eq!(failed, RotationCheck::ReopenFailed);
    assert_eq!(tailer.state(), TailState::RotationPendingDrain);
    assert_eq!(tailer.identity(), old_identity);
    assert!(!tailer.is_closed());

    // The old handle is still readable while the switch keeps failing.
    assert_eq!(next_line(&mut tailer).as_deref(), Some("old2\n"));
    assert_eq!(next_line(&mut tailer), None);
    assert_eq!(tailer.state(), TailState::RotationPendingDrain);

    refuse.store(false, Ordering::SeqCst);
    assert_eq!(tailer.check_rotation(), RotationCheck::Reopened);
    assert_eq!(tailer.state(), TailState::Streaming);
    assert_ne!(tailer.identity(), old_identity);
    assert_eq!(next_line(&mut tailer).as_deref(), Some("new1\n"));
}

#[test]
fn missing_path_during_rotation_is_transient() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("access.log");
    fs::write(&path, "line1\n").unwrap();

    let mut tailer = TailFile::open(&path, StartPosition::Start).unwrap();
    assert_eq!(next_line(&mut tailer).as_deref(), Some("line1\n"));

    fs::rename(&path, dir.path().join("access.log.1")).unwrap();

    assert_eq!(tailer.check_rotation(), RotationCheck::StatFailed);
    assert!(tailer.next_record().unwrap().is_none());
    assert_eq!(tailer.state(), TailState::AwaitingRetry);

    // The new file shows up later and is picked up through the normal path.
    fs::write(&path, "line2\n").unwrap();
    assert_eq!(next_line(&mut tailer), None);
    assert_eq!(next_line(&mut tailer), None);
    assert_eq!(next_line(&mut tailer).as_deref(), Some("line2\n"));
}

#[test]
fn open_fails_for_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.log");

    let err = match TailFile::open(&path, StartPosition::Start) {
        Ok(_) => panic!("expected open to fail"),
        Err(e) => e,
    };

    assert!(matches!(err, TailError::Open { .. }));
    assert_eq!(err.path(), path.as_path());
    assert!(err.to_string().contains("missing.log"));
}

#[test]
fn close_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("access.log");
    fs::write(&path, "line1\n").unwrap();

    let mut tailer = TailFile::open(&path, StartPosition::Start).unwrap();
    tailer.close();
    tailer.close();

    assert!(tailer.is_closed());
    assert!(matches!(
        tailer.next_record(),
        Err(TailError::Closed { .. })
    ));
}
