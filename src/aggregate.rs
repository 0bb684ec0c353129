//! Summary tables computed from a set of order records
//!
//! Every aggregator makes a single pass into a key → accumulator map and then
//! materializes rows. They are pure: no I/O, no state kept between calls, and
//! the input is only read. An empty input produces an empty table.
//!
//! Aggregators accept anything that iterates `&Record`: a `&Vec<Record>`, a
//! `&[Record]` or a [`crate::filter::Selection`].

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

use crate::models::{CategoryPerformance, CityDemographics, DailySales, Record, RfmRow};

/// Count distinct orders per calendar day, ascending by day
pub fn aggregate_daily_sales<'a, I>(records: I) -> Vec<DailySales>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut orders_by_day: BTreeMap<NaiveDate, HashSet<&'a str>> = BTreeMap::new();

    for record in records {
        orders_by_day
            .entry(record.purchase_date())
            .or_default()
            .insert(record.order_id.as_str());
    }

    orders_by_day
        .into_iter()
        .map(|(day, orders)| DailySales { day, sales_count: orders.len() })
        .collect()
}

/// Count order lines per product category
///
/// Rows come out in category-name order so output is reproducible. Use
/// [`crate::ranking`] for best/worst selections.
pub fn aggregate_by_category<'a, I>(records: I) -> Vec<CategoryPerformance>
where
    I: IntoIterator<Item = &'a Record>,
{
    count_by(records, |record| record.category_name.as_str())
        .into_iter()
        .map(|(category_name, order_count)| CategoryPerformance {
            category_name: category_name.to_string(),
            order_count,
        })
        .collect()
}

/// Count order lines per customer city, most active city first
///
/// Ties are broken by city name so the order is total.
pub fn aggregate_by_city<'a, I>(records: I) -> Vec<CityDemographics>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut rows: Vec<CityDemographics> = count_by(records, |record| record.customer_city.as_str())
        .into_iter()
        .map(|(customer_city, customer_count)| CityDemographics {
            customer_city: customer_city.to_string(),
            customer_count,
        })
        .collect();

    // BTreeMap already yields names ascending; a stable sort keeps that for ties.
    rows.sort_by(|a, b| b.customer_count.cmp(&a.customer_count));
    rows
}

#[derive(Debug)]
struct CustomerAccumulator {
    last_purchase: NaiveDateTime,
    frequency: usize,
    monetary: Decimal,
}

/// Score every customer present in `records` on recency, frequency and monetary value
///
/// `global_max_timestamp` must be the latest purchase of the whole, unfiltered
/// dataset so that narrowing the date window does not shift recency. Recency is
/// floored to whole days, so a reference even a few hours earlier than a
/// customer's purchase gives a negative recency rather than an error.
pub fn aggregate_rfm<'a, I>(records: I, global_max_timestamp: NaiveDateTime) -> Vec<RfmRow>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut customers: BTreeMap<&'a str, CustomerAccumulator> = BTreeMap::new();

    for record in records {
        customers
            .entry(record.customer_id.as_str())
            .and_modify(|acc| {
                acc.last_purchase = acc.last_purchase.max(record.purchase_timestamp);
                acc.frequency += 1;
                acc.monetary += record.payment_value;
            })
            .or_insert(CustomerAccumulator {
                last_purchase: record.purchase_timestamp,
                frequency: 1,
                monetary: record.payment_value,
            });
    }

    customers
        .into_iter()
        .map(|(customer_id, acc)| RfmRow {
            customer_id: customer_id.to_string(),
            recency: floor_days(global_max_timestamp - acc.last_purchase),
            frequency: acc.frequency,
            monetary: acc.monetary,
        })
        .collect()
}

fn floor_days(delta: TimeDelta) -> i64 {
    let days = delta.num_days();
    if delta < TimeDelta::days(days) {
        days - 1
    } else {
        days
    }
}

fn count_by<'a, I, F>(records: I, key: F) -> BTreeMap<&'a str, usize>
where
    I: IntoIterator<Item = &'a Record>,
    F: Fn(&'a Record) -> &'a str,
{
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(key(record)).or_insert(0) += 1;
    }
    counts
}
