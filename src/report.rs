//! One dashboard's worth of tables for a date range

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use crate::aggregate::{aggregate_by_category, aggregate_by_city, aggregate_daily_sales, aggregate_rfm};
use crate::config::ReportConfig;
use crate::metrics::MetricsCollector;
use crate::models::{CategoryPerformance, CityDemographics, DailySales, DateRange, RfmRow, RfmSummary};
use crate::ranking;
use crate::store::RecordStore;

/// Every section of the sales dashboard for one date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Range the report was built for
    pub range: DateRange,
    /// Latest purchase of the whole dataset, the recency reference
    pub reference_timestamp: Option<NaiveDateTime>,
    /// Order lines inside the range
    pub records: usize,
    /// Distinct orders inside the range
    pub total_sales: usize,
    /// Orders per day, zero-filled when configured
    pub daily_sales: Vec<DailySales>,
    /// Categories with the most order lines
    pub best_categories: Vec<CategoryPerformance>,
    /// Categories with the fewest order lines
    pub worst_categories: Vec<CategoryPerformance>,
    /// Cities with the most buyers
    pub top_cities: Vec<CityDemographics>,
    /// Headline RFM averages
    pub rfm_summary: RfmSummary,
    /// Most recent customers
    pub top_by_recency: Vec<RfmRow>,
    /// Most frequent customers
    pub top_by_frequency: Vec<RfmRow>,
    /// Highest spending customers
    pub top_by_monetary: Vec<RfmRow>,
    /// Full RFM table, one row per customer
    pub customers: Vec<RfmRow>,
}

impl DashboardReport {
    /// Filter `store` to `range` and compute every section
    ///
    /// An empty selection is not an error: the report comes back with empty
    /// tables and a warning is logged.
    #[must_use]
    pub fn build(store: &RecordStore, range: DateRange, settings: &ReportConfig) -> Self {
        let metrics = MetricsCollector::default();
        let selection = store.select(range);
        if selection.is_empty() {
            warn!(range = %range, "No orders in the selected date range");
        }

        let started = Instant::now();
        let daily = aggregate_daily_sales(&selection);
        metrics.record_aggregation("daily_sales", daily.len(), started.elapsed());

        let started = Instant::now();
        let categories = aggregate_by_category(&selection);
        metrics.record_aggregation("category_performance", categories.len(), started.elapsed());

        let started = Instant::now();
        let cities = aggregate_by_city(&selection);
        metrics.record_aggregation("city_demographics", cities.len(), started.elapsed());

        let reference_timestamp = store.latest_timestamp();
        let started = Instant::now();
        let customers = reference_timestamp
            .map(|latest| aggregate_rfm(&selection, latest))
            .unwrap_or_default();
        metrics.record_aggregation("rfm", customers.len(), started.elapsed());

        let total_sales = ranking::total_sales(&daily);
        let daily_sales = if settings.fill_missing_days {
            ranking::fill_missing_days(&daily)
        } else {
            daily
        };

        let report = Self {
            range,
            reference_timestamp,
            records: selection.len(),
            total_sales,
            daily_sales,
            best_categories: ranking::best_categories(&categories, settings.best_categories),
            worst_categories: ranking::worst_categories(&categories, settings.worst_categories),
            top_cities: ranking::top_cities(&cities, settings.top_cities),
            rfm_summary: ranking::rfm_summary(&customers),
            top_by_recency: ranking::top_by_recency(&customers, settings.top_customers),
            top_by_frequency: ranking::top_by_frequency(&customers, settings.top_customers),
            top_by_monetary: ranking::top_by_monetary(&customers, settings.top_customers),
            customers,
        };

        info!(
            range = %range,
            records = report.records,
            total_sales = report.total_sales,
            customers = report.customers.len(),
            "Built dashboard report"
        );

        report
    }
}
