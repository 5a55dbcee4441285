//! Raw provider records → clean daily price series.
//!
//! Records outside `[start, end]` and records without a finite close are
//! dropped. The remaining records are sorted by date; when a date repeats,
//! the record that appears last in the input wins. A missing adjusted close is
//! filled with the close of the same day and flagged on the series.

use super::error::QuoteviewError;
use super::price::{PricePoint, PriceSeries, RawRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub fn normalize(
    raw_records: &[RawRecord],
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<PriceSeries, QuoteviewError> {
    let mut by_date: BTreeMap<NaiveDate, &RawRecord> = BTreeMap::new();
    for record in raw_records {
        if record.date < start_date || record.date > end_date || !record.close.is_finite() {
            continue;
        }
        by_date.insert(record.date, record);
    }

    if by_date.is_empty() {
        return Err(QuoteviewError::EmptyData {
            symbol: symbol.to_string(),
            start: start_date,
            end: end_date,
        });
    }

    let mut used_close_fallback = false;
    let points: Vec<PricePoint> = by_date
        .into_values()
        .map(|record| {
            let adjusted_close = match record.adjusted_close.filter(|v| v.is_finite()) {
                Some(adj) => adj,
                None => {
                    used_close_fallback = true;
                    record.close
                }
            };
            PricePoint {
                date: record.date,
                close: record.close,
                adjusted_close,
                volume: record.volume,
            }
        })
        .collect();

    if used_close_fallback {
        log::debug!("normalize | {} | adjusted close missing, using close", symbol);
    }

    Ok(PriceSeries::new(symbol.to_string(), points, used_close_fallback))
}
