#![allow(dead_code)]

use chrono::NaiveDate;
use quoteview::domain::error::QuoteviewError;
use quoteview::domain::price::RawRecord;
use quoteview::domain::profile::SymbolProfile;
use quoteview::ports::market_data_port::MarketDataPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockMarketDataPort {
    pub data: HashMap<String, Vec<RawRecord>>,
    pub profiles: HashMap<String, SymbolProfile>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockMarketDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            profiles: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_records(mut self, symbol: &str, records: Vec<RawRecord>) -> Self {
        self.data.insert(symbol.to_string(), records);
        self
    }

    pub fn with_profile(mut self, symbol: &str, profile: SymbolProfile) -> Self {
        self.profiles.insert(symbol.to_string(), profile);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketDataPort {
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawRecord>, QuoteviewError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), start_date, end_date));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(QuoteviewError::provider(symbol, reason.clone()));
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn fetch_profile(&self, symbol: &str) -> Result<SymbolProfile, QuoteviewError> {
        Ok(self.profiles.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_record(date: &str, adjusted_close: f64) -> RawRecord {
    RawRecord::new(
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        adjusted_close,
        Some(adjusted_close),
        1000,
    )
}

/// One record per weekday starting at `start_date`, price rising by `step`.
pub fn generate_records(start_date: &str, count: usize, start_price: f64, step: f64) -> Vec<RawRecord> {
    let mut day = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    let mut records = Vec::with_capacity(count);
    while records.len() < count {
        use chrono::Datelike;
        if day.weekday().number_from_monday() <= 5 {
            let px = start_price + records.len() as f64 * step;
            records.push(RawRecord::new(day, px, Some(px), 1000));
        }
        day = day.succ_opt().unwrap();
    }
    records
}
