//! Error types for the sales-insights library.
//!
//! This module provides custom error types using `thiserror` for better error handling
//! and more specific error messages throughout the application.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in the sales-insights application.
#[derive(Error, Debug)]
pub enum InsightsError {
    /// The requested date range starts after it ends
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange {
        /// Requested first day
        start: NaiveDate,
        /// Requested last day
        end: NaiveDate,
    },

    /// An input record is missing a required field or carries an unusable value
    #[error("Malformed record: {0}")]
    Precondition(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for Result with `InsightsError`
pub type Result<T> = std::result::Result<T, InsightsError>;

impl From<config::ConfigError> for InsightsError {
    fn from(err: config::ConfigError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
