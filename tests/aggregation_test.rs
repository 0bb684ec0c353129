//! Integration tests for the filter → aggregate flow

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sales_insights::{
    aggregate_by_category, aggregate_by_city, aggregate_daily_sales, aggregate_rfm, filter_by_date_range,
    CategoryPerformance, CityDemographics, DailySales, Record, RecordStore, RfmRow,
};

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1).unwrap() + chrono::Days::new(u64::from(n) - 1)
}

fn at(n: u32, hour: u32) -> NaiveDateTime {
    day(n).and_hms_opt(hour, 0, 0).unwrap()
}

fn record(order: &str, customer: &str, on: NaiveDateTime, category: &str, city: &str, pay: i64) -> Record {
    Record {
        order_id: order.to_string(),
        customer_id: customer.to_string(),
        purchase_timestamp: on,
        category_name: category.to_string(),
        customer_city: city.to_string(),
        payment_value: Decimal::from(pay),
    }
}

#[test]
fn test_end_to_end_example() {
    let records = vec![
        record("A", "1", at(1, 9), "X", "NY", 10),
        record("A", "1", at(1, 9), "X", "NY", 5),
        record("B", "2", at(2, 9), "Y", "LA", 20),
    ];
    let store = RecordStore::new(records);
    let global_max = store.latest_timestamp().unwrap();
    let subset = store.filter(day(1), day(2)).unwrap();

    assert_eq!(
        aggregate_daily_sales(&subset),
        vec![
            DailySales { day: day(1), sales_count: 1 },
            DailySales { day: day(2), sales_count: 1 },
        ]
    );
    assert_eq!(
        aggregate_by_category(&subset),
        vec![
            CategoryPerformance { category_name: "X".to_string(), order_count: 2 },
            CategoryPerformance { category_name: "Y".to_string(), order_count: 1 },
        ]
    );
    assert_eq!(
        aggregate_by_city(&subset),
        vec![
            CityDemographics { customer_city: "NY".to_string(), customer_count: 2 },
            CityDemographics { customer_city: "LA".to_string(), customer_count: 1 },
        ]
    );
    assert_eq!(
        aggregate_rfm(&subset, global_max),
        vec![
            RfmRow { customer_id: "1".to_string(), recency: 1, frequency: 2, monetary: Decimal::from(15) },
            RfmRow { customer_id: "2".to_string(), recency: 0, frequency: 1, monetary: Decimal::from(20) },
        ]
    );
}

#[test]
fn test_same_order_same_day_counts_once() {
    let base = vec![record("A", "1", at(3, 8), "X", "NY", 1)];
    let mut doubled = base.clone();
    doubled.push(record("A", "1", at(3, 17), "Y", "NY", 1));

    let before = aggregate_daily_sales(&base)[0].sales_count;
    let after = aggregate_daily_sales(&doubled)[0].sales_count;
    assert_eq!(after, before);

    doubled.push(record("B", "2", at(3, 18), "Y", "NY", 1));
    assert_eq!(aggregate_daily_sales(&doubled)[0].sales_count, before + 1);
}

#[test]
fn test_recency_independent_of_window() {
    let records = vec![
        record("A", "cust", at(90, 12), "X", "NY", 10),
        record("B", "other", at(95, 12), "X", "NY", 10),
        record("C", "latest", at(100, 12), "X", "NY", 10),
    ];
    let store = RecordStore::new(records);
    let global_max = store.latest_timestamp().unwrap();

    let narrow = store.filter(day(1), day(90)).unwrap();
    let wider = store.filter(day(1), day(95)).unwrap();

    let recency_in = |rows: Vec<RfmRow>| rows.into_iter().find(|row| row.customer_id == "cust").unwrap().recency;
    assert_eq!(recency_in(aggregate_rfm(&narrow, global_max)), 10);
    assert_eq!(recency_in(aggregate_rfm(&wider, global_max)), 10);
}

#[test]
fn test_aggregators_are_idempotent() {
    let records = vec![
        record("A", "1", at(1, 9), "X", "NY", 10),
        record("B", "2", at(2, 9), "Y", "LA", 20),
        record("C", "1", at(4, 9), "Y", "NY", 3),
    ];
    let subset = filter_by_date_range(&records, day(1), day(4)).unwrap();
    let reference = at(4, 9);

    assert_eq!(aggregate_daily_sales(&subset), aggregate_daily_sales(&subset));
    assert_eq!(aggregate_by_category(&subset), aggregate_by_category(&subset));
    assert_eq!(aggregate_by_city(&subset), aggregate_by_city(&subset));
    assert_eq!(aggregate_rfm(&subset, reference), aggregate_rfm(&subset, reference));
}

#[test]
fn test_customers_outside_window_have_no_row() {
    let records = vec![
        record("A", "early", at(1, 9), "X", "NY", 10),
        record("B", "late", at(9, 9), "Y", "LA", 20),
    ];
    let store = RecordStore::new(records);
    let subset = store.filter(day(5), day(9)).unwrap();

    let rows = aggregate_rfm(&subset, store.latest_timestamp().unwrap());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].customer_id, "late");
}
