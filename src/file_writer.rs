//! File writing utilities for report export.
//!
//! This module renders a [`DashboardReport`] as plain text, as one CSV file per
//! table, or as a single JSON document.

use crate::error::Result;
use crate::models::OutputFormat;
use crate::report::DashboardReport;
use csv::WriterBuilder;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const CATEGORY_HEADER: &[&str] = &["category_name", "order_count"];

/// Write a report to files under a timestamp-named directory.
///
/// Creates `output_dir/timestamp/` and writes the report there in `format`.
///
/// # Arguments
///
/// * `report` - Report to write
/// * `format` - Output format (TXT, CSV, or JSON)
/// * `output_dir` - Base output directory
/// * `timestamp` - Timestamp string for directory name (e.g., "2025-01-15_14-30-00")
///
/// # Returns
///
/// Vector of paths to created files
pub fn write_report_to_timestamped_dir(
    report: &DashboardReport,
    format: OutputFormat,
    output_dir: &Path,
    timestamp: &str,
) -> Result<Vec<PathBuf>> {
    write_report(report, format, &output_dir.join(timestamp))
}

/// Write a report into `output_dir`, creating the directory if needed.
///
/// TXT and JSON produce one file each; CSV produces one file per table.
pub fn write_report(report: &DashboardReport, format: OutputFormat, output_dir: &Path) -> Result<Vec<PathBuf>> {
    create_dir_all(output_dir)?;

    let output_files = match format {
        OutputFormat::Txt => {
            let file_path = output_dir.join("report.txt");
            let mut writer = BufWriter::new(File::create(&file_path)?);
            render_text_report(report, &mut writer)?;
            writer.flush()?;
            vec![file_path]
        }
        OutputFormat::Csv => {
            let daily = output_dir.join("daily_sales.csv");
            write_csv_rows(&report.daily_sales, &["day", "sales_count"], &daily)?;
            let best = output_dir.join("best_categories.csv");
            write_csv_rows(&report.best_categories, CATEGORY_HEADER, &best)?;
            let worst = output_dir.join("worst_categories.csv");
            write_csv_rows(&report.worst_categories, CATEGORY_HEADER, &worst)?;
            let cities = output_dir.join("top_cities.csv");
            write_csv_rows(&report.top_cities, &["customer_city", "customer_count"], &cities)?;
            let rfm = output_dir.join("rfm.csv");
            write_csv_rows(&report.customers, &["customer_id", "recency", "frequency", "monetary"], &rfm)?;
            vec![daily, best, worst, cities, rfm]
        }
        OutputFormat::Json => {
            let file_path = output_dir.join("report.json");
            let writer = BufWriter::new(File::create(&file_path)?);
            serde_json::to_writer_pretty(writer, report)?;
            vec![file_path]
        }
    };

    tracing::debug!(files = output_files.len(), format = %format, "Report written");
    Ok(output_files)
}

/// Write one table to a CSV file.
///
/// The header is written up front so an empty table still yields a header row.
fn write_csv_rows<T: Serialize>(rows: &[T], header: &[&str], file_path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(file_path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Render a report as plain text.
///
/// Sections follow the dashboard page: daily sales, best and worst categories,
/// buyer cities, then RFM.
pub fn render_text_report<W: Write>(report: &DashboardReport, writer: &mut W) -> Result<()> {
    writeln!(writer, "E-Commerce Dashboard")?;
    writeln!(writer, "Range: {} ({} order lines)", report.range, report.records)?;
    if let Some(reference) = report.reference_timestamp {
        writeln!(writer, "Latest purchase in dataset: {}", reference.format("%Y-%m-%d %H:%M:%S"))?;
    }

    section(writer, "Daily sale")?;
    writeln!(writer, "Total sale: {}", report.total_sales)?;
    for row in &report.daily_sales {
        writeln!(writer, "  {}  {:>6}", row.day, row.sales_count)?;
    }

    section(writer, "Best Performing Product Category")?;
    for row in &report.best_categories {
        writeln!(writer, "  {:<40} {:>8}", row.category_name, row.order_count)?;
    }

    section(writer, "Worst Performing Product Category")?;
    for row in &report.worst_categories {
        writeln!(writer, "  {:<40} {:>8}", row.category_name, row.order_count)?;
    }

    section(writer, &format!("Top {} Buyer City", report.top_cities.len()))?;
    for row in &report.top_cities {
        writeln!(writer, "  {:<40} {:>8}", row.customer_city, row.customer_count)?;
    }

    section(writer, "Best Customer Based on RFM Parameters")?;
    let summary = &report.rfm_summary;
    writeln!(writer, "Customers: {}", summary.customers)?;
    writeln!(writer, "Average Recency (days): {}", metric(summary.average_recency))?;
    writeln!(writer, "Average Frequency: {}", metric(summary.average_frequency))?;
    writeln!(writer, "Average Monetary: {}", metric(summary.average_monetary))?;

    writeln!(writer, "\nBy Recency (days)")?;
    for row in &report.top_by_recency {
        writeln!(writer, "  {:<36} {:>8}", row.customer_id, row.recency)?;
    }
    writeln!(writer, "\nBy Frequency")?;
    for row in &report.top_by_frequency {
        writeln!(writer, "  {:<36} {:>8}", row.customer_id, row.frequency)?;
    }
    writeln!(writer, "\nBy Monetary")?;
    for row in &report.top_by_monetary {
        writeln!(writer, "  {:<36} {:>12}", row.customer_id, row.monetary)?;
    }

    Ok(())
}

fn section<W: Write>(writer: &mut W, title: &str) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{title}")?;
    writeln!(writer, "{}", "-".repeat(title.len()))?;
    Ok(())
}

fn metric(value: Option<Decimal>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}
