//! Month-end resampling with month-over-month change.

use super::performance::percent_change;
use super::price::{PricePoint, PriceSeries};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Display format for month-end dates, e.g. "Jan 31, 2024".
pub const LABEL_FORMAT: &str = "%b %d, %Y";

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPoint {
    pub month_end_date: NaiveDate,
    pub adjusted_close: f64,
    /// `None` for the first month and after a zero close.
    pub percent_change: Option<f64>,
    pub formatted_label: String,
}

pub type MonthlySeries = Vec<MonthlyPoint>;

pub fn format_label(date: NaiveDate) -> String {
    date.format(LABEL_FORMAT).to_string()
}

/// Keeps the last observed point of each calendar month. This is the true
/// month-end close only when the input has no gap at the month boundary.
pub fn to_monthly(series: &PriceSeries) -> MonthlySeries {
    let mut month_ends: BTreeMap<(i32, u32), &PricePoint> = BTreeMap::new();
    for point in series.points() {
        let key = (point.date.year(), point.date.month());
        let entry = month_ends.entry(key).or_insert(point);
        if point.date > entry.date {
            *entry = point;
        }
    }

    let mut monthly = Vec::with_capacity(month_ends.len());
    let mut prev_close: Option<f64> = None;

    for point in month_ends.into_values() {
        monthly.push(MonthlyPoint {
            month_end_date: point.date,
            adjusted_close: point.adjusted_close,
            percent_change: prev_close.and_then(|prev| percent_change(prev, point.adjusted_close)),
            formatted_label: format_label(point.date),
        });
        prev_close = Some(point.adjusted_close);
    }

    monthly
}
