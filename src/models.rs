//! Data models for order records and the summary tables derived from them
//!
//! Records are the read-only input rows; every other type here is an
//! immutable output table row that is recomputed on each request.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{InsightsError, Result};

/// One order line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Order identifier, shared by every line of the same order
    pub order_id: String,
    /// Customer identifier
    pub customer_id: String,
    /// When the order was placed (timezone-naive)
    pub purchase_timestamp: NaiveDateTime,
    /// Product category label
    pub category_name: String,
    /// City the customer lives in
    pub customer_city: String,
    /// Amount paid for this line
    pub payment_value: Decimal,
}

impl Record {
    /// Calendar day of the purchase
    #[must_use]
    pub fn purchase_date(&self) -> NaiveDate {
        self.purchase_timestamp.date()
    }
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (inclusive)
    pub start: NaiveDate,
    /// Last day (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting one that starts after it ends
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(InsightsError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// True if `timestamp` falls on any day of the range, whatever the time of day
    #[must_use]
    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        let day = timestamp.date();
        self.start <= day && day <= self.end
    }

    /// Number of calendar days covered
    #[must_use]
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Distinct orders placed on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    /// Calendar day
    pub day: NaiveDate,
    /// Number of distinct order ids purchased that day
    pub sales_count: usize,
}

/// Line items sold in one product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPerformance {
    /// Category label
    pub category_name: String,
    /// Number of order lines in the category
    pub order_count: usize,
}

/// Order lines attributed to buyers from one city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityDemographics {
    /// City name
    pub customer_city: String,
    /// Number of order lines from the city
    pub customer_count: usize,
}

/// Recency/Frequency/Monetary scores of one customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfmRow {
    /// Customer identifier
    pub customer_id: String,
    /// Whole days between the dataset's latest purchase and this customer's latest purchase
    pub recency: i64,
    /// Number of order lines
    pub frequency: usize,
    /// Total amount paid
    pub monetary: Decimal,
}

/// Averages over an RFM table, shown as headline metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfmSummary {
    /// Number of customers in the table
    pub customers: usize,
    /// Mean recency in days, one decimal place
    pub average_recency: Option<Decimal>,
    /// Mean frequency, two decimal places
    pub average_frequency: Option<Decimal>,
    /// Mean monetary value, two decimal places
    pub average_monetary: Option<Decimal>,
}

/// Output format for exported reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values format, one file per table
    Csv,
    /// Plain text format
    Txt,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = InsightsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "txt" => Ok(Self::Txt),
            "json" => Ok(Self::Json),
            other => Err(InsightsError::InvalidConfig(format!(
                "Unknown output format: {other}. Must be one of: txt, csv, json"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
