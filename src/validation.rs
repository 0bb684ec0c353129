use chrono::NaiveDate;
use std::path::Path;

use crate::error::{InsightsError, Result};
use crate::models::DateRange;

/// Validation utilities for command-line and configuration input
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Parse a `YYYY-MM-DD` date
    pub fn parse_date(value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|e| InsightsError::InvalidDate(format!("{value}: {e} (expected YYYY-MM-DD)")))
    }

    /// Validate date range
    ///
    /// Missing bounds fall back to `default`, the observed bounds of the data.
    pub fn validate_date_range(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        default: DateRange,
    ) -> Result<DateRange> {
        let range = DateRange::new(start.unwrap_or(default.start), end.unwrap_or(default.end))?;

        if range.end < default.start || range.start > default.end {
            tracing::warn!(
                requested = %range,
                available = %default,
                "Requested date range lies outside the data; the report will be empty"
            );
        }

        Ok(range)
    }

    /// Validate a top-K size
    pub fn validate_top_k(name: &str, k: usize) -> Result<()> {
        if k == 0 {
            return Err(InsightsError::InvalidConfig(format!("{name} must be greater than 0")));
        }

        if k > 1000 {
            return Err(InsightsError::InvalidConfig(format!("{name} too large (max 1000)")));
        }

        Ok(())
    }

    /// Validate that an input file exists and is a regular file
    pub fn validate_input_path(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(InsightsError::InvalidConfig("Input path cannot be empty".to_string()));
        }

        if !path.exists() {
            return Err(InsightsError::InvalidConfig(format!(
                "Input file does not exist: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(InsightsError::InvalidConfig(format!(
                "Input path is not a file: {}",
                path.display()
            )));
        }

        Ok(())
    }

    /// Validate an output directory path
    pub fn validate_output_dir(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.is_empty() {
            return Err(InsightsError::InvalidConfig("Output directory cannot be empty".to_string()));
        }

        if path.exists() && !path.is_dir() {
            return Err(InsightsError::InvalidConfig(format!(
                "Output path exists and is not a directory: {path_str}"
            )));
        }

        if path_str.len() > 4096 {
            return Err(InsightsError::InvalidConfig(
                "Output path too long (max 4096 characters)".to_string(),
            ));
        }

        Ok(())
    }
}
