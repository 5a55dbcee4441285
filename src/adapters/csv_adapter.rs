//! CSV directory market-data adapter for offline use.
//!
//! History lives in `{base_path}/{symbol}.csv` with the header
//! `date,close,adj_close,volume[,dividends,stock_splits]`. An empty
//! `adj_close` cell means the provider had no adjusted price for that day.
//! An optional `{symbol}.profile.ini` supplies the `[profile]` section.

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::QuoteviewError;
use crate::domain::price::RawRecord;
use crate::domain::profile::SymbolProfile;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    close: f64,
    #[serde(default)]
    adj_close: Option<f64>,
    #[serde(default)]
    volume: Option<i64>,
    #[serde(default)]
    dividends: Option<f64>,
    #[serde(default)]
    stock_splits: Option<f64>,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn profile_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.profile.ini", symbol))
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawRecord>, QuoteviewError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            log::debug!("fetch_history | no file {}", path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            QuoteviewError::provider(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut records = Vec::new();

        for result in rdr.deserialize::<CsvRow>() {
            let row = result
                .map_err(|e| QuoteviewError::provider(symbol, format!("CSV parse error: {}", e)))?;

            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
                QuoteviewError::provider(symbol, format!("invalid date {:?}: {}", row.date, e))
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            records.push(RawRecord {
                date,
                close: row.close,
                adjusted_close: row.adj_close,
                volume: row.volume.unwrap_or_default(),
                dividends: row.dividends.unwrap_or_default(),
                stock_splits: row.stock_splits.unwrap_or_default(),
            });
        }

        log::debug!(
            "fetch_history | {} | {} records from {}",
            symbol,
            records.len(),
            path.display()
        );
        Ok(records)
    }

    fn fetch_profile(&self, symbol: &str) -> Result<SymbolProfile, QuoteviewError> {
        let path = self.profile_path(symbol);
        if !path.exists() {
            return Ok(SymbolProfile::default());
        }
        let config = FileConfigAdapter::from_file(&path)
            .map_err(|e| QuoteviewError::provider(symbol, e.to_string()))?;
        Ok(SymbolProfile {
            display_name: config.get_string("profile", "name"),
            description: config.get_string("profile", "description"),
            current_bid_price: config
                .get_string("profile", "bid")
                .and_then(|b| b.parse().ok()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,close,adj_close,volume,dividends,stock_splits\n\
            2024-01-15,105.0,104.0,50000,0,0\n\
            2024-01-16,110.0,,60000,0.5,0\n\
            2024-01-17,115.0,114.0,55000,0,2\n";
        fs::write(path.join("BHP.csv"), csv_content).unwrap();

        fs::write(
            path.join("SPY.csv"),
            "date,close,volume\n2024-01-15,470.0,1000\n",
        )
        .unwrap();

        fs::write(
            path.join("BHP.profile.ini"),
            "[profile]\nname = BHP Group\ndescription = Mining.\nbid = 45.10\n",
        )
        .unwrap();

        (dir, path)
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn fetch_history_returns_records() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let records = adapter.fetch_history("BHP", d(15), d(17)).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].date, d(15));
        assert_eq!(records[0].close, 105.0);
        assert_eq!(records[0].adjusted_close, Some(104.0));
        assert_eq!(records[0].volume, 50000);
        assert_eq!(records[1].adjusted_close, None);
        assert_eq!(records[1].dividends, 0.5);
        assert_eq!(records[2].stock_splits, 2.0);
    }

    #[test]
    fn fetch_history_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let records = adapter.fetch_history("BHP", d(16), d(16)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, d(16));
    }

    #[test]
    fn missing_adj_close_column_reads_as_absent() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let records = adapter.fetch_history("SPY", d(1), d(31)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].adjusted_close, None);
        assert_eq!(records[0].dividends, 0.0);
    }

    #[test]
    fn missing_file_is_empty_history() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let records = adapter.fetch_history("XYZ", d(1), d(31)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn malformed_row_is_provider_error() {
        let (_dir, path) = setup_test_data();
        fs::write(path.join("BAD.csv"), "date,close\nnot-a-date,1.0\n").unwrap();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch_history("BAD", d(1), d(31)).unwrap_err();
        assert!(matches!(err, QuoteviewError::Provider { .. }));
    }

    #[test]
    fn fetch_profile_reads_ini() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let profile = adapter.fetch_profile("BHP").unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("BHP Group"));
        assert_eq!(profile.description.as_deref(), Some("Mining."));
        assert_eq!(profile.current_bid_price, Some(45.10));
    }

    #[test]
    fn fetch_profile_without_file_is_empty() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        assert_eq!(adapter.fetch_profile("SPY").unwrap(), SymbolProfile::default());
    }
}
