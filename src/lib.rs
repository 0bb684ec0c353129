//! Sales Insights - E-commerce order reporting
//!
//! A Rust library for summarizing an e-commerce order dataset over a date
//! range: daily sales, category performance, buyer cities and RFM
//! (Recency/Frequency/Monetary) customer segmentation.
//!
//! # Features
//!
//! - Load joined order lines from CSV
//! - Inclusive date-range filtering
//! - Pure single-pass aggregators
//! - Best/worst/top rankings and headline metrics
//! - Export to multiple formats (TXT, CSV, JSON)

/// Summary table aggregators
pub mod aggregate;
/// Configuration management
pub mod config;
/// Error types
pub mod error;
/// Report export
pub mod file_writer;
/// Date-range filtering
pub mod filter;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Ordering and top-K selection over summary tables
pub mod ranking;
/// Dashboard report assembly
pub mod report;
/// Record loading and the in-memory store
pub mod store;
/// Input validation
pub mod validation;

// Re-export key components for easier access
pub use aggregate::{aggregate_by_category, aggregate_by_city, aggregate_daily_sales, aggregate_rfm};
pub use error::{InsightsError, Result};
pub use filter::{filter_by_date_range, Selection};
pub use models::{CategoryPerformance, CityDemographics, DailySales, DateRange, OutputFormat, Record, RfmRow};
pub use report::DashboardReport;
pub use store::{CsvRecordSource, RecordSource, RecordStore};
