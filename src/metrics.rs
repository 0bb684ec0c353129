use metrics::{counter, gauge, histogram};
use std::time::Duration;

use crate::models::OutputFormat;

/// Metrics collection and management
///
/// Emits through the `metrics` facade. Nothing is recorded unless the
/// embedding process installs a recorder.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    /// Records read from the input file
    pub records_loaded_total: &'static str,
    /// Time spent loading the input file
    pub load_duration: &'static str,
    /// Records kept by the latest date filter
    pub records_selected: &'static str,
    /// Time spent building one summary table
    pub aggregation_duration: &'static str,
    /// Rows in the latest summary table of each kind
    pub aggregation_rows: &'static str,
    /// Export runs
    pub export_operations_total: &'static str,
    /// Files written by exports
    pub export_files_created_total: &'static str,
    /// Failures by kind
    pub errors_total: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            records_loaded_total: "sales_insights_records_loaded_total",
            load_duration: "sales_insights_load_duration_seconds",
            records_selected: "sales_insights_records_selected",
            aggregation_duration: "sales_insights_aggregation_duration_seconds",
            aggregation_rows: "sales_insights_aggregation_rows",
            export_operations_total: "sales_insights_export_operations_total",
            export_files_created_total: "sales_insights_export_files_created_total",
            errors_total: "sales_insights_errors_total",
        }
    }
}

impl MetricsCollector {
    /// Record a completed load of the record store
    pub fn record_load(&self, count: usize, duration: Duration) {
        counter!(self.records_loaded_total).increment(count as u64);
        histogram!(self.load_duration).record(duration.as_secs_f64());
    }

    /// Record the size of a date-filtered selection
    pub fn record_selection(&self, selected: usize) {
        gauge!(self.records_selected).set(selected as f64);
    }

    /// Record one aggregator run
    pub fn record_aggregation(&self, table: &'static str, rows: usize, duration: Duration) {
        histogram!(self.aggregation_duration, "table" => table).record(duration.as_secs_f64());
        gauge!(self.aggregation_rows, "table" => table).set(rows as f64);
    }

    /// Record an export run
    pub fn record_export(&self, format: OutputFormat, file_count: usize) {
        counter!(self.export_operations_total, "format" => format.extension()).increment(1);
        counter!(self.export_files_created_total, "format" => format.extension()).increment(file_count as u64);
    }

    /// Record error metrics
    pub fn record_error(&self, error_type: &'static str) {
        counter!(self.errors_total, "type" => error_type).increment(1);
    }
}
