//! Trailing-window and year-to-date returns.
//!
//! pct(L) = (adj[last] - adj[last - L]) / adj[last - L] * 100
//!
//! Lookbacks are trading-day offsets into the series, not calendar spans:
//! 1M is 30 points back, 1Y is 252. A series with fewer than L + 1 points
//! reports `InsufficientHistory` for that label. A zero base price has no
//! defined change and reports `Undefined`; the monthly table uses the same
//! [`percent_change`] and leaves that cell blank.

use super::price::{PricePoint, PriceSeries};
use chrono::Datelike;
use std::fmt;

const TRADING_DAYS_PER_YEAR: usize = 252;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    OneDay,
    OneMonth,
    OneYear,
    ThreeYears,
    FiveYears,
    TenYears,
    YearToDate,
}

impl Period {
    pub const ALL: [Period; 7] = [
        Period::OneDay,
        Period::OneMonth,
        Period::OneYear,
        Period::ThreeYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Period::OneDay => "1D",
            Period::OneMonth => "1M",
            Period::OneYear => "1Y",
            Period::ThreeYears => "3Y",
            Period::FiveYears => "5Y",
            Period::TenYears => "10Y",
            Period::YearToDate => "YTD",
        }
    }

    /// Trading-day offset for fixed lookbacks; `None` for YTD.
    pub fn lookback(&self) -> Option<usize> {
        match self {
            Period::OneDay => Some(1),
            Period::OneMonth => Some(30),
            Period::OneYear => Some(TRADING_DAYS_PER_YEAR),
            Period::ThreeYears => Some(TRADING_DAYS_PER_YEAR * 3),
            Period::FiveYears => Some(TRADING_DAYS_PER_YEAR * 5),
            Period::TenYears => Some(TRADING_DAYS_PER_YEAR * 10),
            Period::YearToDate => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Period> {
        Period::ALL.into_iter().find(|p| p.label() == label)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Value(f64),
    InsufficientHistory,
    Undefined,
}

impl Metric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::InsufficientHistory | Metric::Undefined => None,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{:.2}%", v),
            Metric::InsufficientHistory => f.write_str("n/a (insufficient history)"),
            Metric::Undefined => f.write_str("n/a (zero base price)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    entries: Vec<(Period, Metric)>,
}

impl PerformanceReport {
    pub fn get(&self, period: Period) -> Metric {
        self.entries
            .iter()
            .find(|(p, _)| *p == period)
            .map(|(_, m)| *m)
            .unwrap_or(Metric::InsufficientHistory)
    }

    /// Lookup by display label ("1D", "YTD", ...).
    pub fn by_label(&self, label: &str) -> Option<Metric> {
        Period::from_label(label).map(|p| self.get(p))
    }

    /// Entries in fixed label order: 1D, 1M, 1Y, 3Y, 5Y, 10Y, YTD.
    pub fn iter(&self) -> impl Iterator<Item = (Period, Metric)> + '_ {
        self.entries.iter().copied()
    }
}

pub fn compute_performance(series: &PriceSeries) -> PerformanceReport {
    let points = series.points();
    let entries = Period::ALL
        .into_iter()
        .map(|period| {
            let metric = match period.lookback() {
                Some(lookback) => trailing_change(points, lookback),
                None => year_to_date_change(points),
            };
            (period, metric)
        })
        .collect();
    PerformanceReport { entries }
}

/// `(current - base) / base * 100`, or `None` when the base is zero.
pub fn percent_change(base: f64, current: f64) -> Option<f64> {
    if base == 0.0 {
        None
    } else {
        Some((current - base) / base * 100.0)
    }
}

fn to_metric(change: Option<f64>) -> Metric {
    change.map_or(Metric::Undefined, Metric::Value)
}

fn trailing_change(points: &[PricePoint], lookback: usize) -> Metric {
    let Some(last) = points.len().checked_sub(1) else {
        return Metric::InsufficientHistory;
    };
    match last.checked_sub(lookback) {
        Some(base) => to_metric(percent_change(
            points[base].adjusted_close,
            points[last].adjusted_close,
        )),
        None => Metric::InsufficientHistory,
    }
}

/// Measured from the earliest point in the last point's calendar year, which
/// understates the true year-to-date return when the series starts mid-year.
fn year_to_date_change(points: &[PricePoint]) -> Metric {
    let Some(last) = points.last() else {
        return Metric::InsufficientHistory;
    };
    let year = last.date.year();
    let first_of_year = points
        .iter()
        .find(|p| p.date.year() == year)
        .unwrap_or(last);
    to_metric(percent_change(
        first_of_year.adjusted_close,
        last.adjusted_close,
    ))
}
