//! Loading and holding the order record store
//!
//! The store is read once, sorted by purchase time, and never mutated
//! afterwards. Everything downstream borrows from it.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::{InsightsError, Result};
use crate::filter::{self, Selection};
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{DateRange, Record};

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Anything that can supply the full set of order records
#[cfg_attr(test, mockall::automock)]
pub trait RecordSource {
    /// Read every record
    fn load(&self) -> Result<Vec<Record>>;

    /// Human readable origin, used in logs
    fn describe(&self) -> String;
}

/// Reads records from a CSV file with a header row
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    /// Source backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvRecordSource {
    fn load(&self) -> Result<Vec<Record>> {
        let file = File::open(&self.path)?;
        read_records(file)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Row as it appears in the file; every field is checked before it becomes a [`Record`]
#[derive(Debug, Deserialize)]
struct CsvRow {
    order_id: Option<String>,
    #[serde(alias = "customer_id")]
    custom_id: Option<String>,
    #[serde(alias = "purchase_timestamp")]
    order_purchase_timestamp: Option<String>,
    category_name: Option<String>,
    customer_city: Option<String>,
    payment_value: Option<String>,
}

impl CsvRow {
    fn into_record(self, line: u64) -> Result<Record> {
        let timestamp = required(self.order_purchase_timestamp, "order_purchase_timestamp", line)?;
        let payment = required(self.payment_value, "payment_value", line)?;

        let purchase_timestamp = parse_timestamp(&timestamp)
            .map_err(|e| InsightsError::Precondition(format!("line {line}: {e}")))?;
        let payment_value = parse_payment(&payment)
            .map_err(|e| InsightsError::Precondition(format!("line {line}: {e}")))?;

        Ok(Record {
            order_id: required(self.order_id, "order_id", line)?,
            customer_id: required(self.custom_id, "custom_id", line)?,
            purchase_timestamp,
            category_name: required(self.category_name, "category_name", line)?,
            customer_city: required(self.customer_city, "customer_city", line)?,
            payment_value,
        })
    }
}

fn required(value: Option<String>, field: &str, line: u64) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(InsightsError::Precondition(format!("line {line}: missing required field '{field}'"))),
    }
}

/// Parse a purchase timestamp
///
/// Accepts `YYYY-MM-DD HH:MM:SS` (optionally with fractional seconds or a `T`
/// separator), `YYYY-MM-DD HH:MM`, or a bare date taken as midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(timestamp);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| InsightsError::InvalidDate(format!("unrecognized timestamp '{value}'")))
}

fn parse_payment(value: &str) -> Result<Decimal> {
    let value = value.trim();
    let amount = Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| InsightsError::Precondition(format!("invalid payment_value '{value}': {e}")))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(InsightsError::Precondition(format!("negative payment_value '{value}'")));
    }

    Ok(amount)
}

/// Parse every row of a CSV stream into records
///
/// Fails on the first malformed row; nothing is partially recovered. Line
/// numbers in errors are those of the file, so quoted fields spanning several
/// lines are accounted for.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut row = csv::StringRecord::new();
    let mut records = Vec::new();
    let mut payment_total = Decimal::ZERO;

    while csv_reader.read_record(&mut row)? {
        let line = row.position().map_or(0, csv::Position::line);
        let record = row.deserialize::<CsvRow>(Some(&headers))?.into_record(line)?;
        payment_total = payment_total.checked_add(record.payment_value).ok_or_else(|| {
            InsightsError::Precondition(format!("line {line}: payment_value total exceeds the representable range"))
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Reject record sets whose combined payments cannot be summed
///
/// Every monetary aggregate is a sum over a subset of non-negative payments,
/// so a representable grand total keeps all of them in range.
fn check_payment_total(records: &[Record]) -> Result<()> {
    let mut total = Decimal::ZERO;
    for record in records {
        total = total.checked_add(record.payment_value).ok_or_else(|| {
            InsightsError::Precondition(format!(
                "order {}: payment_value total exceeds the representable range",
                record.order_id
            ))
        })?;
    }
    Ok(())
}

/// Immutable, time-ordered collection of every order record
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Build a store, sorting records by purchase time
    ///
    /// The sort is stable, so records with equal timestamps keep their input order.
    #[must_use]
    pub fn new(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|record| record.purchase_timestamp);
        Self { records }
    }

    /// Load every record from `source`
    pub fn load(source: &dyn RecordSource) -> Result<Self> {
        let timer = OperationTimer::new("load_records");
        info!(source = %source.describe(), "Loading order records");

        let records = source
            .load()
            .and_then(|records| check_payment_total(&records).map(|()| records))
            .inspect_err(|_| {
                MetricsCollector::default().record_error("load");
            })?;
        let store = Self::new(records);

        MetricsCollector::default().record_load(store.len(), timer.elapsed());
        if store.is_empty() {
            warn!(source = %source.describe(), "Record source contained no rows");
        } else if let Some(bounds) = store.date_bounds() {
            info!(records = store.len(), bounds = %bounds, "Loaded order records");
        }
        timer.finish();

        Ok(store)
    }

    /// Load a CSV file
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(&CsvRecordSource::new(path.as_ref()))
    }

    /// All records, oldest first
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the store holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest purchase timestamp in the store
    #[must_use]
    pub fn earliest_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.first().map(|record| record.purchase_timestamp)
    }

    /// Latest purchase timestamp across the whole store, the RFM recency reference
    #[must_use]
    pub fn latest_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.last().map(|record| record.purchase_timestamp)
    }

    /// First and last purchase day, the default dashboard range
    #[must_use]
    pub fn date_bounds(&self) -> Option<DateRange> {
        let start = self.earliest_timestamp()?.date();
        let end = self.latest_timestamp()?.date();
        Some(DateRange { start, end })
    }

    /// Records purchased between `start` and `end`, both inclusive
    pub fn filter(&self, start: NaiveDate, end: NaiveDate) -> Result<Selection<'_>> {
        filter::filter_by_date_range(&self.records, start, end)
    }

    /// Records inside an already validated range
    #[must_use]
    pub fn select(&self, range: DateRange) -> Selection<'_> {
        let selection = filter::select(&self.records, range);
        debug!(selected = selection.len(), "Selected records for range");
        MetricsCollector::default().record_selection(selection.len());
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
order_id,custom_id,order_purchase_timestamp,category_name,customer_city,payment_value
o2,c2,2018-01-03 09:00:00,toys,rio de janeiro,20.50
o1,c1,2018-01-01 10:15:00,bed_bath_table,sao paulo,99.90
o1,c1,2018-01-01 10:15:00,bed_bath_table,sao paulo,10
";

    #[test]
    fn test_read_records_parses_and_store_sorts() {
        let records = read_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].payment_value, Decimal::new(2050, 2));

        let store = RecordStore::new(records);
        assert_eq!(store.records()[0].order_id, "o1");
        assert_eq!(
            store.latest_timestamp(),
            Some(NaiveDateTime::parse_from_str("2018-01-03 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap())
        );
        let bounds = store.date_bounds().unwrap();
        assert_eq!(bounds.num_days(), 3);
    }

    #[test]
    fn test_customer_id_header_alias() {
        let data = "order_id,customer_id,purchase_timestamp,category_name,customer_city,payment_value\n\
                    o1,c9,2018-02-01,toys,natal,1.00\n";
        let records = read_records(data.as_bytes()).unwrap();
        assert_eq!(records[0].customer_id, "c9");
        assert_eq!(records[0].purchase_timestamp.time(), chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_field_is_precondition_error() {
        let data = "order_id,custom_id,order_purchase_timestamp,category_name,customer_city,payment_value\n\
                    o1,,2018-01-01 10:00:00,toys,natal,1.00\n";
        let err = read_records(data.as_bytes()).unwrap_err();
        match err {
            InsightsError::Precondition(message) => {
                assert!(message.contains("custom_id"));
                assert!(message.contains("line 2"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_payment_rejected() {
        let data = "order_id,custom_id,order_purchase_timestamp,category_name,customer_city,payment_value\n\
                    o1,c1,2018-01-01 10:00:00,toys,natal,-3.00\n";
        assert!(matches!(read_records(data.as_bytes()), Err(InsightsError::Precondition(_))));
    }

    #[test]
    fn test_line_number_counts_multiline_fields() {
        let data = "order_id,custom_id,order_purchase_timestamp,category_name,customer_city,payment_value\n\
                    o1,c1,2018-01-01 10:00:00,toys,\"sao\npaulo\",1.00\n\
                    o2,,2018-01-01 11:00:00,toys,natal,1.00\n";
        match read_records(data.as_bytes()).unwrap_err() {
            InsightsError::Precondition(message) => assert!(message.contains("line 4"), "{message}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_payment_total_overflow_rejected() {
        let data = "order_id,custom_id,order_purchase_timestamp,category_name,customer_city,payment_value\n\
                    o1,c1,2018-01-01 10:00:00,toys,natal,5e28\n\
                    o2,c1,2018-01-02 10:00:00,toys,natal,5e28\n";
        match read_records(data.as_bytes()).unwrap_err() {
            InsightsError::Precondition(message) => assert!(message.contains("line 3"), "{message}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_overflowing_payments_from_any_source() {
        let huge = read_records(
            "order_id,custom_id,order_purchase_timestamp,category_name,customer_city,payment_value\n\
             o1,c1,2018-01-01 10:00:00,toys,natal,5e28\n"
                .as_bytes(),
        )
        .unwrap();
        let mut source = MockRecordSource::new();
        source
            .expect_load()
            .returning(move || Ok(huge.iter().cloned().chain(huge.iter().cloned()).collect()));
        source.expect_describe().return_const("mock".to_string());

        assert!(matches!(RecordStore::load(&source), Err(InsightsError::Precondition(_))));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2017-10-02 10:56:33").is_ok());
        assert!(parse_timestamp("2017-10-02T10:56:33").is_ok());
        assert!(parse_timestamp("2017-10-02 10:56:33.250").is_ok());
        assert!(parse_timestamp("2017-10-02 10:56").is_ok());
        assert!(parse_timestamp("2017-10-02").is_ok());
        assert!(parse_timestamp("02/10/2017").is_err());
    }

    #[test]
    fn test_load_from_mock_source() {
        let mut source = MockRecordSource::new();
        source
            .expect_load()
            .times(1)
            .returning(|| read_records(SAMPLE.as_bytes()));
        source.expect_describe().return_const("mock".to_string());

        let store = RecordStore::load(&source).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_load_propagates_source_error() {
        let mut source = MockRecordSource::new();
        source
            .expect_load()
            .returning(|| Err(InsightsError::Precondition("line 7: missing required field 'order_id'".to_string())));
        source.expect_describe().return_const("mock".to_string());

        assert!(RecordStore::load(&source).is_err());
    }

    #[test]
    fn test_empty_store_has_no_bounds() {
        let store = RecordStore::new(Vec::new());
        assert!(store.latest_timestamp().is_none());
        assert!(store.date_bounds().is_none());
    }
}
