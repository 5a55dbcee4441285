//! Request pipeline: provider → normalizer → performance engine.
//!
//! The shell passes every request parameter explicitly; nothing here holds
//! state between calls.

use super::error::QuoteviewError;
use super::monthly::{to_monthly, MonthlySeries};
use super::normalizer::normalize;
use super::performance::{compute_performance, PerformanceReport};
use super::price::PriceSeries;
use super::profile::SymbolProfile;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewRequest {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// False when `start` is only the fetch horizon and the range should
    /// begin at the first available date instead.
    pub explicit_start: bool,
}

impl ViewRequest {
    /// Trims and upper-cases the symbol.
    pub fn new(symbol: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            start,
            end,
            explicit_start: true,
        }
    }

    /// Request whose start was not chosen by the user.
    pub fn from_default_start(symbol: &str, horizon: NaiveDate, end: NaiveDate) -> Self {
        Self {
            explicit_start: false,
            ..Self::new(symbol, horizon, end)
        }
    }
}

#[derive(Debug, Clone)]
pub struct SymbolView {
    pub request: ViewRequest,
    pub profile: SymbolProfile,
    pub series: PriceSeries,
    pub performance: PerformanceReport,
    pub monthly: MonthlySeries,
}

impl SymbolView {
    /// Start of the displayed range: the requested start, or the first
    /// available date when the start was defaulted.
    pub fn range_start(&self) -> NaiveDate {
        if self.request.explicit_start {
            return self.request.start;
        }
        self.series
            .first_available_date()
            .unwrap_or(self.request.start)
    }

    /// One line per label, e.g. "1D: 1.23%".
    pub fn performance_lines(&self) -> Vec<String> {
        self.performance
            .iter()
            .map(|(period, metric)| format!("{}: {}", period, metric))
            .collect()
    }
}

pub fn build_view(
    port: &dyn MarketDataPort,
    request: &ViewRequest,
) -> Result<SymbolView, QuoteviewError> {
    let raw = port.fetch_history(&request.symbol, request.start, request.end)?;
    log::debug!(
        "build_view | {} | {} raw records",
        request.symbol,
        raw.len()
    );

    let series = normalize(&raw, &request.symbol, request.start, request.end)?;

    let profile = match port.fetch_profile(&request.symbol) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("profile unavailable for {}: {}", request.symbol, e);
            SymbolProfile::default()
        }
    };

    let performance = compute_performance(&series);
    let monthly = to_monthly(&series);

    Ok(SymbolView {
        request: request.clone(),
        profile,
        series,
        performance,
        monthly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::RawRecord;
    use std::cell::Cell;

    struct StubPort {
        records: Vec<RawRecord>,
        profile_fails: bool,
        history_calls: Cell<usize>,
    }

    impl MarketDataPort for StubPort {
        fn fetch_history(
            &self,
            _symbol: &str,
            _start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> Result<Vec<RawRecord>, QuoteviewError> {
            self.history_calls.set(self.history_calls.get() + 1);
            Ok(self.records.clone())
        }

        fn fetch_profile(&self, symbol: &str) -> Result<SymbolProfile, QuoteviewError> {
            if self.profile_fails {
                return Err(QuoteviewError::provider(symbol, "profile down"));
            }
            Ok(SymbolProfile {
                display_name: Some("Test Corp".into()),
                ..SymbolProfile::default()
            })
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn request_normalizes_symbol() {
        let req = ViewRequest::new("  bhp.ax ", d(2024, 1, 1), d(2024, 2, 1));
        assert_eq!(req.symbol, "BHP.AX");
    }

    #[test]
    fn builds_full_view() {
        let port = StubPort {
            records: vec![
                RawRecord::new(d(2024, 1, 31), 100.0, Some(100.0), 1),
                RawRecord::new(d(2024, 2, 29), 110.0, Some(110.0), 1),
            ],
            profile_fails: false,
            history_calls: Cell::new(0),
        };
        let req = ViewRequest::new("tst", d(2024, 1, 1), d(2024, 3, 1));
        let view = build_view(&port, &req).unwrap();

        assert_eq!(port.history_calls.get(), 1);
        assert_eq!(view.profile.display_name_or_na(), "Test Corp");
        assert_eq!(view.series.len(), 2);
        assert_eq!(view.monthly.len(), 2);
        let lines = view.performance_lines();
        assert_eq!(lines[0], "1D: 10.00%");
        assert_eq!(lines[1], "1M: n/a (insufficient history)");
        assert_eq!(lines[6], "YTD: 10.00%");
    }

    #[test]
    fn range_start_follows_first_available_date_when_defaulted() {
        let port = StubPort {
            records: vec![
                RawRecord::new(d(2015, 6, 1), 10.0, Some(10.0), 1),
                RawRecord::new(d(2015, 6, 2), 11.0, Some(11.0), 1),
            ],
            profile_fails: false,
            history_calls: Cell::new(0),
        };

        let defaulted = ViewRequest::from_default_start("new", d(2000, 1, 1), d(2024, 6, 28));
        assert!(!defaulted.explicit_start);
        let view = build_view(&port, &defaulted).unwrap();
        assert_eq!(view.range_start(), d(2015, 6, 1));

        let chosen = ViewRequest::new("new", d(2010, 1, 1), d(2024, 6, 28));
        let view = build_view(&port, &chosen).unwrap();
        assert_eq!(view.range_start(), d(2010, 1, 1));
    }

    #[test]
    fn empty_history_is_empty_data() {
        let port = StubPort {
            records: vec![],
            profile_fails: false,
            history_calls: Cell::new(0),
        };
        let req = ViewRequest::new("NONE", d(2024, 1, 1), d(2024, 3, 1));
        let err = build_view(&port, &req).unwrap_err();
        assert!(matches!(err, QuoteviewError::EmptyData { symbol, .. } if symbol == "NONE"));
    }

    #[test]
    fn profile_failure_does_not_fail_view() {
        let port = StubPort {
            records: vec![RawRecord::new(d(2024, 1, 2), 10.0, None, 1)],
            profile_fails: true,
            history_calls: Cell::new(0),
        };
        let req = ViewRequest::new("TST", d(2024, 1, 1), d(2024, 3, 1));
        let view = build_view(&port, &req).unwrap();
        assert_eq!(view.profile, SymbolProfile::default());
        assert!(view.series.used_close_fallback());
    }
}
