//! Ordering, top-K selection and headline metrics layered on top of the
//! aggregator tables.
//!
//! The aggregators stay unordered (or minimally ordered); everything a
//! dashboard needs to pick "best", "worst" or "top" rows happens here.

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{CategoryPerformance, CityDemographics, DailySales, RfmRow, RfmSummary};

/// Categories with the most order lines, ties by name
#[must_use]
pub fn best_categories(rows: &[CategoryPerformance], k: usize) -> Vec<CategoryPerformance> {
    top_k(rows, k, |a, b| {
        b.order_count
            .cmp(&a.order_count)
            .then_with(|| a.category_name.cmp(&b.category_name))
    })
}

/// Categories with the fewest order lines, ties by name
#[must_use]
pub fn worst_categories(rows: &[CategoryPerformance], k: usize) -> Vec<CategoryPerformance> {
    top_k(rows, k, |a, b| {
        a.order_count
            .cmp(&b.order_count)
            .then_with(|| a.category_name.cmp(&b.category_name))
    })
}

/// Cities with the most buyers
#[must_use]
pub fn top_cities(rows: &[CityDemographics], k: usize) -> Vec<CityDemographics> {
    top_k(rows, k, |a, b| {
        b.customer_count
            .cmp(&a.customer_count)
            .then_with(|| a.customer_city.cmp(&b.customer_city))
    })
}

/// Most recent customers first
#[must_use]
pub fn top_by_recency(rows: &[RfmRow], k: usize) -> Vec<RfmRow> {
    top_k(rows, k, |a, b| {
        a.recency.cmp(&b.recency).then_with(|| a.customer_id.cmp(&b.customer_id))
    })
}

/// Customers with the most order lines first
#[must_use]
pub fn top_by_frequency(rows: &[RfmRow], k: usize) -> Vec<RfmRow> {
    top_k(rows, k, |a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    })
}

/// Highest spending customers first
#[must_use]
pub fn top_by_monetary(rows: &[RfmRow], k: usize) -> Vec<RfmRow> {
    top_k(rows, k, |a, b| {
        b.monetary
            .cmp(&a.monetary)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    })
}

/// Total number of sales across the daily table
#[must_use]
pub fn total_sales(rows: &[DailySales]) -> usize {
    rows.iter().map(|row| row.sales_count).sum()
}

/// Mean recency, frequency and monetary value of an RFM table
///
/// Averages are `None` for an empty table.
#[must_use]
pub fn rfm_summary(rows: &[RfmRow]) -> RfmSummary {
    let customers = rows.len();
    if customers == 0 {
        return RfmSummary {
            customers,
            average_recency: None,
            average_frequency: None,
            average_monetary: None,
        };
    }

    let count = Decimal::from(customers);
    let recency: Decimal = rows.iter().map(|row| Decimal::from(row.recency)).sum();
    let frequency: Decimal = rows.iter().map(|row| Decimal::from(row.frequency)).sum();
    let monetary: Decimal = rows.iter().map(|row| row.monetary).sum();

    RfmSummary {
        customers,
        average_recency: Some((recency / count).round_dp(1)),
        average_frequency: Some((frequency / count).round_dp(2)),
        average_monetary: Some((monetary / count).round_dp(2)),
    }
}

/// Expand a daily table into a continuous series, inserting zero-sale days
/// between the first and last day present
#[must_use]
pub fn fill_missing_days(rows: &[DailySales]) -> Vec<DailySales> {
    let counts: BTreeMap<_, _> = rows.iter().map(|row| (row.day, row.sales_count)).collect();
    let (Some(first), Some(last)) = (counts.keys().next().copied(), counts.keys().next_back().copied()) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|day| DailySales {
            day,
            sales_count: counts.get(&day).copied().unwrap_or(0),
        })
        .collect()
}

fn top_k<T, F>(rows: &[T], k: usize, compare: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let mut sorted = rows.to_vec();
    sorted.sort_by(compare);
    sorted.truncate(k);
    sorted
}
