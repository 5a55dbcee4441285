//! Market-data provider port.

use crate::domain::error::QuoteviewError;
use crate::domain::price::RawRecord;
use crate::domain::profile::SymbolProfile;
use chrono::NaiveDate;

pub trait MarketDataPort {
    /// Daily records for `[start_date, end_date]`. An unknown symbol or a
    /// window without trading days is an empty vector, not an error.
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawRecord>, QuoteviewError>;

    fn fetch_profile(&self, symbol: &str) -> Result<SymbolProfile, QuoteviewError>;
}
