//! Raw provider records and the normalized daily price series.

use chrono::NaiveDate;

/// One daily record as delivered by a market-data provider.
///
/// `adjusted_close` is `None` when the provider does not report an adjusted
/// price for the day; the normalizer resolves it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub adjusted_close: Option<f64>,
    pub volume: i64,
    pub dividends: f64,
    pub stock_splits: f64,
}

impl RawRecord {
    pub fn new(date: NaiveDate, close: f64, adjusted_close: Option<f64>, volume: i64) -> Self {
        Self {
            date,
            close,
            adjusted_close,
            volume,
            dividends: 0.0,
            stock_splits: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: i64,
}

/// Daily prices for one symbol, strictly ascending by date.
///
/// Only the normalizer builds these, so the ordering invariant holds for
/// every instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
    used_close_fallback: bool,
}

impl PriceSeries {
    pub(crate) fn new(symbol: String, points: Vec<PricePoint>, used_close_fallback: bool) -> Self {
        Self {
            symbol,
            points,
            used_close_fallback,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when at least one point took `close` because the provider had no
    /// adjusted close for it.
    pub fn used_close_fallback(&self) -> bool {
        self.used_close_fallback
    }

    pub fn first_available_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(d: u32, px: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
            close: px,
            adjusted_close: px,
            volume: 1000,
        }
    }

    #[test]
    fn raw_record_new_has_no_corporate_actions() {
        let r = RawRecord::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 10.0, None, 5);
        assert_eq!(r.dividends, 0.0);
        assert_eq!(r.stock_splits, 0.0);
        assert!(r.adjusted_close.is_none());
    }

    #[test]
    fn series_accessors() {
        let series = PriceSeries::new("BHP".into(), vec![point(2, 10.0), point(3, 11.0)], false);
        assert_eq!(series.symbol(), "BHP");
        assert_eq!(series.len(), 2);
        assert!(!series.is_empty());
        assert!(!series.used_close_fallback());
        assert_eq!(
            series.first_available_date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
        assert_eq!(
            series.last_date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap())
        );
        assert_eq!(series.last().map(|p| p.adjusted_close), Some(11.0));
    }
}
