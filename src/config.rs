use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{InsightsError, Result};
use crate::models::OutputFormat;
use crate::validation::InputValidator;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input dataset settings
    pub data: DataConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Dashboard layout settings
    pub report: ReportConfig,
    /// Export settings
    pub export: ExportConfig,
}

/// Input dataset settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path of the joined order CSV
    pub path: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is unset
    pub level: String,
    /// Optional rolling log file
    pub file_path: Option<String>,
    /// Console format, "json" or "text"
    pub format: String,
}

/// How many rows each dashboard section shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Size of the best performing categories list
    pub best_categories: usize,
    /// Size of the worst performing categories list
    pub worst_categories: usize,
    /// Size of the top buyer cities list
    pub top_cities: usize,
    /// Size of each best-customer list
    pub top_customers: usize,
    /// Insert zero-sale days into the daily series
    pub fill_missing_days: bool,
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Format used when none is given on the command line
    pub default_format: String,
    /// Directory exports are written under
    pub output_directory: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            best_categories: 5,
            worst_categories: 5,
            top_cities: 10,
            top_customers: 5,
            fill_missing_days: true,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                path: "data/all_df.csv".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            report: ReportConfig::default(),
            export: ExportConfig {
                default_format: "txt".to_string(),
                output_directory: "./output".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    ///
    /// Defaults, then `config/default.*`, `config/local.*`, the optional
    /// explicit file, and finally `SALES_INSIGHTS__SECTION__KEY` variables.
    pub fn load(explicit_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            // Start with default values
            .add_source(Config::try_from(&Self::default())?)
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = explicit_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let app_config: Self = builder
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("SALES_INSIGHTS").prefix_separator("__").separator("__"))
            .build()?
            .try_deserialize()?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.data.path.trim().is_empty() {
            return Err(InsightsError::InvalidConfig("data.path cannot be empty".to_string()));
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(InsightsError::InvalidConfig(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            )));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(InsightsError::InvalidConfig(format!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format, valid_formats
            )));
        }

        // Validate report config
        InputValidator::validate_top_k("report.best_categories", self.report.best_categories)?;
        InputValidator::validate_top_k("report.worst_categories", self.report.worst_categories)?;
        InputValidator::validate_top_k("report.top_cities", self.report.top_cities)?;
        InputValidator::validate_top_k("report.top_customers", self.report.top_customers)?;

        // Validate export config
        self.default_format()?;
        if self.export.output_directory.trim().is_empty() {
            return Err(InsightsError::InvalidConfig(
                "export.output_directory cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed default export format
    pub fn default_format(&self) -> Result<OutputFormat> {
        self.export.default_format.parse()
    }

    /// Get dataset path from environment or config
    #[must_use]
    pub fn get_data_path(&self) -> String {
        std::env::var("SALES_DATA_PATH").unwrap_or_else(|_| self.data.path.clone())
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.data.path, "data/all_df.csv");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.report.top_cities, 10);
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.report.best_categories = 0;
        assert!(config.validate().is_err());
    }
}
