use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One JSON access log line, newline included.
pub fn access_line(host: &str, status: i64, duration: f64) -> String {
    format!(
        "{{\"time\":\"2024-05-01T12:00:00Z\",\"host\":\"{host}\",\"status_code\":{status},\"duration\":{duration},\"method\":\"GET\"}}\n"
    )
}

/// A log file inside a test directory that can be appended to, truncated and
/// rotated the way a web server would.
pub struct LogFile {
    path: PathBuf,
}

impl LogFile {
    pub fn create(dir: &Path, name: &str) -> Self {
        let path = dir.join(name);
        fs::write(&path, "").expect("failed to create log file");
        Self { path }
    }

    /// Wrap an existing file without touching it.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, text: &str) {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .expect("failed to open log file for append");
        file.write_all(text.as_bytes())
            .expect("failed to append to log file");
    }

    pub fn append_access(&self, host: &str, status: i64, duration: f64) {
        self.append(&access_line(host, status, duration));
    }

    /// Truncate in place, like `copytruncate`.
    pub fn truncate(&self) {
        OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)
            .expect("failed to truncate log file");
    }

    /// Move the current file to `rotated` and start an empty file at the
    /// original path.
    pub fn rotate(&self, rotated: &str) -> PathBuf {
        let target = self.path.with_file_name(rotated);
        fs::rename(&self.path, &target).expect("failed to rename log file");
        fs::write(&self.path, "").expect("failed to recreate log file");
        target
    }
}
