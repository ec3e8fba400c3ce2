//! Application-wide error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A KG line that cannot be decoded into a record. Aborts the run.
    #[error("malformed record at {}:{line_no}: {reason}; line: {line}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line_no: usize,
        reason: String,
        line: String,
    },

    /// Recall and base coverage are undefined over an empty baseline.
    #[error("config error: base KG has no {granularity} relations; recall is undefined")]
    EmptyBaseline { granularity: String },

    #[error("oracle error: {0}")]
    Oracle(#[from] ProviderError),

    #[error("report error: {0}")]
    Report(String),
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Report(e.to_string())
    }
}
