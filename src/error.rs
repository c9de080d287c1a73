//! Error types for the client feature pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, CleanError>;

/// Main error type for the cleaning pipeline
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Data error: {0}")]
    DataError(String),

    /// A column required by a stage is absent from the table
    #[error("Column not found: {column} (required by {stage})")]
    ColumnNotFound { column: String, stage: String },

    #[error("{0} is not fitted")]
    NotFitted(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

impl CleanError {
    pub(crate) fn missing_column(column: impl Into<String>, stage: impl Into<String>) -> Self {
        CleanError::ColumnNotFound {
            column: column.into(),
            stage: stage.into(),
        }
    }
}

impl From<polars::error::PolarsError> for CleanError {
    fn from(err: polars::error::PolarsError) -> Self {
        CleanError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CleanError {
    fn from(err: serde_json::Error) -> Self {
        CleanError::SerializationError(err.to_string())
    }
}
