use crate::conf::TailConfig;
use crate::pipeline::aggregate::{Aggregator, ReportStyle};
use crate::pipeline::error::PipelineError;
use crate::pipeline::shutdown::ShutdownSignal;
use crate::pipeline::stream::stream_file;
use crate::summary::SummaryTable;
use crate::tail::TailError;
use owo_colors::OwoColorize;
use std::io::Write;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Result of a run that ended through shutdown rather than total failure.
#[derive(Debug)]
pub struct RunSummary {
    pub table: SummaryTable,
    pub malformed: u64,
    pub failed_files: Vec<TailError>,
}

/// Tail every configured file until `signal` fires, then drain the queue and
/// print the final report to `out`.
///
/// Per-file failures are written to `err_out` as they happen while the other
/// files keep streaming. Once every file has failed the aggregator is stopped
/// without a final report and [`PipelineError::AllFilesFailed`] is returned.
pub async fn run<W, E>(
    config: &TailConfig,
    signal: ShutdownSignal,
    out: W,
    mut err_out: E,
    style: ReportStyle,
) -> Result<RunSummary, PipelineError>
where
    W: Write + Send + 'static,
    E: Write,
{
    let (tx, rx) = mpsc::channel(config.queue_capacity());
    let aggregator = tokio::spawn(Aggregator::new(config.interval, out, style).run(rx));

    let mut streams = JoinSet::new();
    for path in &config.files {
        streams.spawn(stream_file(
            path.clone(),
            config.start_position(),
            tx.clone(),
            signal.clone(),
        ));
    }

    let total = config.files.len();
    info!(
        files = total,
        queue_capacity = config.queue_capacity(),
        from_start = config.from_start,
        "tailing started"
    );

    let mut failures = Vec::new();
    while let Some(joined) = streams.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(path = %e.path().display(), error = %e, "file failed");
                report_file_error(&mut err_out, &e, style);
                failures.push(e);

                if failures.len() == total {
                    aggregator.abort();
                    let _ = aggregator.await;
                    report_total_failure(&mut err_out, total, style);
                    return Err(PipelineError::AllFilesFailed { errors: failures });
                }
            }
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => warn!(error = %e, "stream task cancelled"),
        }
    }

    // Every producer has stopped; closing the queue lets the aggregator drain.
    drop(tx);
    let outcome = aggregator.await.map_err(PipelineError::Aggregator)?;

    Ok(RunSummary {
        table: outcome.table,
        malformed: outcome.malformed,
        failed_files: failures,
    })
}

fn report_file_error<E: Write>(err_out: &mut E, e: &TailError, style: ReportStyle) {
    let tag = format!("[{}]", e.path().display());
    let result = if style.error_color {
        writeln!(err_out, "{} {}: {e}", tag.bold(), "error".red().bold())
    } else {
        writeln!(err_out, "{tag} error: {e}")
    };
    if let Err(io) = result {
        warn!(error = %io, "failed to write file error");
    }
}

fn report_total_failure<E: Write>(err_out: &mut E, total: usize, style: ReportStyle) {
    let line = format!("File error summary: {total} of {total} files failed");
    let result = if style.error_color {
        writeln!(err_out, "{}", line.red())
    } else {
        writeln!(err_out, "{line}")
    };
    if let Err(io) = result {
        warn!(error = %io, "failed to write error summary");
    }
}
