//! Date-range selection over the record store

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;
use crate::models::{DateRange, Record};

/// Borrowed view of the records that fell inside a date range
///
/// Keeps the store's ordering. Iterating `&Selection` yields `&Record`, so a
/// selection can be handed to any aggregator directly.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    range: DateRange,
    records: Vec<&'a Record>,
}

impl<'a> Selection<'a> {
    /// The range this selection was taken with
    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
    }

    /// Number of selected records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no record fell inside the range
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Selected records in store order
    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }
}

impl<'s, 'a> IntoIterator for &'s Selection<'a> {
    type Item = &'a Record;
    type IntoIter = std::iter::Copied<std::slice::Iter<'s, &'a Record>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter().copied()
    }
}

/// Select every record purchased on a day between `start` and `end`, both inclusive
///
/// Fails with [`crate::error::InsightsError::InvalidRange`] when `start > end`.
/// A range outside the data simply selects nothing.
pub fn filter_by_date_range(records: &[Record], start: NaiveDate, end: NaiveDate) -> Result<Selection<'_>> {
    let range = DateRange::new(start, end)?;
    Ok(select(records, range))
}

/// Select with an already validated range
#[must_use]
pub fn select(records: &[Record], range: DateRange) -> Selection<'_> {
    let selected: Vec<&Record> = records
        .iter()
        .filter(|record| range.contains(&record.purchase_timestamp))
        .collect();

    debug!(
        start = %range.start,
        end = %range.end,
        selected = selected.len(),
        total = records.len(),
        "Applied date range filter"
    );

    Selection { range, records: selected }
}
