use accesstail_core::conf::TailConfig;
use accesstail_core::logging::{LogFormat, init_logging};
use accesstail_core::pipeline::{self, PipelineError, ReportStyle, ShutdownHandle, wait_for_signal};
use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(
    name = "accesstail",
    version,
    about = "Tail JSON access logs and print a per-host summary"
)]
struct Cli {
    /// Access log to tail (repeatable)
    #[arg(short = 'f', long = "file", value_name = "PATH", required = true)]
    files: Vec<PathBuf>,

    /// Read each file from the beginning instead of its current end
    #[arg(long)]
    from_start: bool,

    /// Report interval, e.g. 500ms, 10s, 1m30s
    #[arg(long, value_parser = humantime::parse_duration, default_value = "10s")]
    interval: Duration,

    /// Diagnostic log format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Auto)]
    log_format: LogFormat,
}

/// Long flags that may also be spelled with a single dash.
const LONG_FLAGS: [&str; 4] = ["file", "from-start", "interval", "log-format"];

/// Rewrite `-file a.log` / `-interval=5s` into clap's `--file` / `--interval=5s`.
/// Everything after a bare `--` is passed through untouched.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut passthrough = false;

    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }

            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
                    if LONG_FLAGS.contains(&name) {
                        OsString::from(format!("-{text}"))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let config = match TailConfig::new(cli.files, cli.from_start, cli.interval) {
        Ok(config) => config,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    init_logging(cli.log_format);
    debug!(files = config.files.len(), interval = ?config.interval, "configuration loaded");

    match run(config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("accesstail: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: TailConfig) -> anyhow::Result<ExitCode> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(async {
        let shutdown = ShutdownHandle::new();

        tokio::spawn({
            let shutdown = shutdown.clone();
            async move {
                match wait_for_signal().await {
                    Ok(()) => shutdown.trigger(),
                    Err(e) => error!(error = %e, "failed to install signal handler"),
                }
            }
        });

        let style = ReportStyle {
            color: io::stdout().is_terminal(),
            error_color: io::stderr().is_terminal(),
        };

        match pipeline::run(&config, shutdown.subscribe(), io::stdout(), io::stderr(), style).await {
            Ok(summary) => {
                info!(
                    hosts = summary.table.len(),
                    requests = summary.table.total_requests(),
                    malformed = summary.malformed,
                    failed_files = summary.failed_files.len(),
                    "pipeline stopped"
                );
                println!("Gracefully shut down...");
                Ok(ExitCode::SUCCESS)
            }
            Err(PipelineError::AllFilesFailed { errors }) => {
                debug!(failed_files = errors.len(), "every file failed");
                Ok(ExitCode::from(1))
            }
            Err(e) => Err(e).context("pipeline failed"),
        }
    })
}
