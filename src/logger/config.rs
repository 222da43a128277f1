use serde::Deserialize;
use std::fmt;
use std::io::{Error, ErrorKind};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Output format of the `[log]` section; anything but these two is a config error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Plain,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Plain => write!(f, "plain"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

fn build_filter(log_level: &str) -> Result<EnvFilter, Error> {
    EnvFilter::try_new(log_level).map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Invalid log level '{}': {}", log_level, e),
        )
    })
}

/// Installs the global subscriber. Local runs get timestamps and no targets,
/// prod runs the reverse.
pub fn init_logger(log_level: &str, format: LogFormat, is_local: bool) -> Result<(), Error> {
    let filter = build_filter(log_level)?;
    let spans = FmtSpan::NEW | FmtSpan::CLOSE;

    let installed = match (is_local, format) {
        (true, LogFormat::Plain) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_span_events(spans)
            .try_init(),
        (true, LogFormat::Json) => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_span_events(spans)
            .try_init(),
        (false, LogFormat::Plain) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_span_events(spans)
            .without_time()
            .try_init(),
        (false, LogFormat::Json) => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_span_events(spans)
            .without_time()
            .try_init(),
    };

    installed.map_err(|e| Error::new(ErrorKind::AlreadyExists, e.to_string()))
}
