//! Dataset loading error types
//!
//! Defines all errors that can occur while reading the case table and the
//! world topology. Any of these aborts the derivation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading input data
#[derive(Error, Debug)]
pub enum DatasetError {
    /// I/O operation failed
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delimited case table could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The topology file is not valid JSON or does not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is missing from the case table header
    #[error("Missing column in case table: {0}")]
    MissingColumn(String),

    /// The topology is structurally invalid (bad arc index, missing object, ...)
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// A background load task panicked or was cancelled
    #[error("Load task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for DatasetError {
    fn from(err: tokio::task::JoinError) -> Self {
        DatasetError::Task(err.to_string())
    }
}

/// Result type alias for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatasetError::MissingColumn("location".to_string());
        assert_eq!(err.to_string(), "Missing column in case table: location");

        let err = DatasetError::InvalidTopology("arc index 12 out of range".to_string());
        assert_eq!(err.to_string(), "Invalid topology: arc index 12 out of range");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DatasetError = json_err.into();
        assert!(matches!(err, DatasetError::Json(_)));
    }
}
