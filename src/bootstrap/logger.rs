//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once per run, after the effective level is known.
//! Output goes to stderr so result tables printed on stdout stay clean.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Initialise the global tracing subscriber.
///
/// When `from_cli` is `true` the level came from `-v` flags and wins over
/// `RUST_LOG`. Otherwise `RUST_LOG` wins and the configured `level` is the
/// fallback.
pub fn init(level: &str, from_cli: bool) -> Result<(), AppError> {
    let filter = if from_cli {
        EnvFilter::try_new(level)
            .or_else(|_| EnvFilter::try_from_default_env())
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))?
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// Map a `-v` count onto a level string. Zero means "use the configured level".
///
/// ```text
/// -v    → warn
/// -vv   → info
/// -vvv  → debug   (prompts, answers, per-pair verdicts)
/// -vvvv → trace   (full request/response payloads)
/// ```
pub fn level_for_verbosity(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Parse a log level string into a [`LevelFilter`], returning an error on
/// unrecognised values.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}
