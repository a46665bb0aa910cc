use crate::harness::tracing::init_test_tracing;
use accesstail_core::conf::TailConfig;
use accesstail_core::pipeline::{self, PipelineError, ReportStyle, RunSummary, ShutdownHandle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};

/// In-memory writer shared between the pipeline and the test.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Handle to a pipeline running on the test's tokio runtime.
pub struct TestPipeline {
    shutdown: ShutdownHandle,
    stdout: SharedBuf,
    stderr: SharedBuf,
    task: JoinHandle<Result<RunSummary, PipelineError>>,
}

impl TestPipeline {
    /// Start tailing `files`. Must be called from within a tokio runtime.
    pub fn start(files: Vec<PathBuf>, from_start: bool, interval: Duration) -> Self {
        init_test_tracing();

        let config = TailConfig::new(files, from_start, interval).expect("invalid test config");
        let shutdown = ShutdownHandle::new();
        let stdout = SharedBuf::default();
        let stderr = SharedBuf::default();

        let task = tokio::spawn({
            let signal = shutdown.subscribe();
            let out = stdout.clone();
            let err = stderr.clone();
            async move { pipeline::run(&config, signal, out, err, ReportStyle::default()).await }
        });

        Self {
            shutdown,
            stdout,
            stderr,
            task,
        }
    }

    pub fn stdout(&self) -> String {
        self.stdout.contents()
    }

    /// Poll stdout until `pred` holds (or panic).
    pub async fn wait_for_stdout(&self, within: Duration, pred: impl Fn(&str) -> bool) {
        let deadline = Instant::now() + within;
        loop {
            if pred(&self.stdout()) {
                return;
            }
            if Instant::now() > deadline {
                panic!("condition not met on stdout:\n{}", self.stdout());
            }
            sleep(Duration::from_millis(20)).await;
        }
    }

    /// Trigger shutdown and wait for the pipeline to drain.
    pub async fn stop(self) -> Finished {
        self.shutdown.trigger();
        self.join().await
    }

    /// Wait for the pipeline to end on its own.
    pub async fn join(self) -> Finished {
        let result = timeout(Duration::from_secs(5), self.task)
            .await
            .expect("pipeline did not stop in time")
            .expect("pipeline task panicked");
        Finished {
            result,
            stdout: self.stdout.contents(),
            stderr: self.stderr.contents(),
        }
    }
}

/// Everything a stopped pipeline left behind.
pub struct Finished {
    pub result: Result<RunSummary, PipelineError>,
    pub stdout: String,
    pub stderr: String,
}
