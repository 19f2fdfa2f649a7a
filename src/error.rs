//! Error types for taskloop.

use chrono::NaiveDate;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error while reading or writing the task file or config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The task file could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be read or written.
    #[error("config error: {0}")]
    Config(String),

    /// A date argument was not `YYYY-MM-DD`.
    #[error("invalid date '{0}', use YYYY-MM-DD")]
    InvalidDate(String),

    /// User input rejected by validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No task with the given id.
    #[error("task {0} not found")]
    TaskNotFound(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses a `YYYY-MM-DD` argument.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}
