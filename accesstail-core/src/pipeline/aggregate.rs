use crate::record::{self, RawRecord};
use crate::summary::SummaryTable;
use chrono::Local;
use owo_colors::OwoColorize;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{trace, warn};

const FINAL_BANNER: &str = "Printing final summary:";

/// Whether reports (stdout) and per-file errors (stderr) are colored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportStyle {
    pub color: bool,
    pub error_color: bool,
}

/// What the aggregator hands back once the queue has closed and drained.
#[derive(Debug)]
pub struct AggregateOutcome {
    pub table: SummaryTable,
    pub malformed: u64,
}

/// Sole owner of the summary table. Consumes raw lines, prints a report every
/// `interval` and a final one when the queue closes.
pub struct Aggregator<W> {
    interval: Duration,
    out: W,
    style: ReportStyle,
    table: SummaryTable,
    malformed: u64,
}

impl<W: Write + Send + 'static> Aggregator<W> {
    pub fn new(interval: Duration, out: W, style: ReportStyle) -> Self {
        Self {
            interval,
            out,
            style,
            table: SummaryTable::new(),
            malformed: 0,
        }
    }

    /// Runs until every sender is dropped and the queue is empty. Shutdown
    /// signals are not observed here.
    pub async fn run(mut self, mut rx: mpsc::Receiver<RawRecord>) -> AggregateOutcome {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                item = rx.recv() => match item {
                    Some(raw) => self.ingest(&raw),
                    None => break,
                },
                _ = ticker.tick() => self.report(),
            }
        }

        let banner = if self.style.color {
            FINAL_BANNER.green().to_string()
        } else {
            FINAL_BANNER.to_string()
        };
        self.emit(&format!("{banner}\n"));
        self.report();

        AggregateOutcome {
            table: self.table,
            malformed: self.malformed,
        }
    }

    fn ingest(&mut self, raw: &[u8]) {
        match record::decode(raw) {
            Ok(rec) => self.table.update(&rec),
            Err(e) => {
                self.malformed += 1;
                trace!(error = %e, "skipping malformed record");
            }
        }
    }

    fn report(&mut self) {
        let mut text = self.table.format(Local::now());
        if self.malformed > 0 {
            let line = format!("missing field or malformed log: {}", self.malformed);
            if self.style.color {
                text.push_str(&line.yellow().to_string());
            } else {
                text.push_str(&line);
            }
            text.push('\n');
        }
        self.emit(&text);
    }

    fn emit(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!(error = %e, "failed to write report");
        }
    }
}
