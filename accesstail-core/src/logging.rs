use std::io::{self, IsTerminal};
use tracing_subscriber::{EnvFilter, fmt};

/// Output format for diagnostic logs written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// JSON when stderr is not a terminal, pretty otherwise.
    #[default]
    Auto,
    Json,
    Pretty,
}

impl LogFormat {
    fn resolve(self) -> LogFormat {
        match self {
            LogFormat::Auto if io::stderr().is_terminal() => LogFormat::Pretty,
            LogFormat::Auto => LogFormat::Json,
            other => other,
        }
    }
}

/// Initialize the logging system with environment-based filtering.
///
/// Level filtering comes from `RUST_LOG` and defaults to "info". Logs go to
/// stderr so stdout carries only the summary reports.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format.resolve() {
        LogFormat::Pretty => fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init(),
        _ => fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .flatten_event(true)
            .init(),
    }
}
