//! Unit tests for config.rs module

use std::io::Write;

use sales_insights::config::{AppConfig, ReportConfig};
use sales_insights::models::OutputFormat;
use tempfile::Builder;

#[test]
fn test_default_report_config() {
    let config = AppConfig::default();

    assert_eq!(config.report.best_categories, 5);
    assert_eq!(config.report.worst_categories, 5);
    assert_eq!(config.report.top_cities, 10);
    assert_eq!(config.report.top_customers, 5);
    assert!(config.report.fill_missing_days);
}

#[test]
fn test_default_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_default_export_config() {
    let config = AppConfig::default();

    assert_eq!(config.export.default_format, "txt");
    assert_eq!(config.export.output_directory, "./output");
    assert_eq!(config.default_format().unwrap(), OutputFormat::Txt);
}

#[test]
fn test_config_validation_success() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_config_validation_empty_data_path() {
    let mut config = AppConfig::default();
    config.data.path = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_invalid_log_level() {
    let mut config = AppConfig::default();
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_valid_log_levels() {
    for level in ["trace", "debug", "info", "warn", "error"] {
        let mut config = AppConfig::default();
        config.logging.level = level.to_string();
        assert!(config.validate().is_ok(), "Failed for level: {level}");
    }
}

#[test]
fn test_config_validation_invalid_log_format() {
    let mut config = AppConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_invalid_export_format() {
    let mut config = AppConfig::default();
    config.export.default_format = "pdf".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_zero_top_k() {
    let settings = [
        ReportConfig { best_categories: 0, ..ReportConfig::default() },
        ReportConfig { worst_categories: 0, ..ReportConfig::default() },
        ReportConfig { top_cities: 0, ..ReportConfig::default() },
        ReportConfig { top_customers: 0, ..ReportConfig::default() },
    ];
    for report in settings {
        let mut config = AppConfig::default();
        config.report = report;
        assert!(config.validate().is_err());
    }
}

#[test]
fn test_load_with_explicit_file() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[data]
path = "/srv/data/orders.csv"

[report]
top_cities = 3
fill_missing_days = false

[export]
default_format = "json"
"#
    )
    .unwrap();

    let config = AppConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.data.path, "/srv/data/orders.csv");
    assert_eq!(config.report.top_cities, 3);
    assert!(!config.report.fill_missing_days);
    // untouched keys keep their defaults
    assert_eq!(config.report.best_categories, 5);
    assert_eq!(config.default_format().unwrap(), OutputFormat::Json);
}

#[test]
fn test_load_rejects_invalid_file_values() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[report]\ntop_customers = 0").unwrap();

    assert!(AppConfig::load(Some(file.path())).is_err());
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(AppConfig::load(Some(&missing)).is_err());
}

#[test]
fn test_config_clone() {
    let config = AppConfig::default();
    let cloned = config.clone();
    assert_eq!(config.data.path, cloned.data.path);
    assert_eq!(config.logging.level, cloned.logging.level);
}
