//! Yahoo Finance adapter.
//!
//! Daily history comes from `/v8/finance/chart/{symbol}` with dividend and
//! split events attached. The endpoint treats `period2` as exclusive, so the
//! request asks for one day past the end of the window. Timestamps are
//! shifted by the exchange's GMT offset before truncating to a date.
//!
//! The profile comes from `/v10/finance/quoteSummary/{symbol}` (name, business
//! summary, bid). When that endpoint refuses the request, the chart `meta`
//! block supplies the name and market price but no description. A missing or
//! zero bid is replaced by the regular market price.

use crate::domain::error::QuoteviewError;
use crate::domain::price::RawRecord;
use crate::domain::profile::SymbolProfile;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: i64 = 30;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";
const NOT_FOUND_CODE: &str = "Not Found";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    events: Option<ChartEvents>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(rename = "gmtoffset", default)]
    gmt_offset: i64,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartEvents {
    dividends: Option<HashMap<String, DividendEvent>>,
    splits: Option<HashMap<String, SplitEvent>>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    numerator: f64,
    denominator: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
    #[serde(rename = "adjclose")]
    adj_close: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<i64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(rename = "adjclose")]
    adj_close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    asset_profile: Option<AssetProfile>,
    summary_detail: Option<SummaryDetail>,
    price: Option<PriceModule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    long_business_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryDetail {
    #[serde(default)]
    bid: RawValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    #[serde(default)]
    regular_market_price: RawValue,
}

/// Yahoo's `{"raw": 1.5, "fmt": "1.50"}` number wrapper; `{}` when absent.
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

pub struct YahooAdapter {
    base_url: String,
    client: Client,
}

impl YahooAdapter {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, QuoteviewError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| QuoteviewError::ConfigInvalid {
                section: "provider".into(),
                key: "base_url".into(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, QuoteviewError> {
        let base_url = config
            .get_string("provider", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = config.get_int("provider", "timeout_secs", DEFAULT_TIMEOUT_SECS);
        if timeout_secs <= 0 {
            return Err(QuoteviewError::ConfigInvalid {
                section: "provider".into(),
                key: "timeout_secs".into(),
                reason: "must be a positive number of seconds".into(),
            });
        }
        let user_agent = config
            .get_string("provider", "user_agent")
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        Self::new(&base_url, Duration::from_secs(timeout_secs as u64), &user_agent)
    }

    fn chart_url(&self, symbol: &str, query: &[(&str, String)]) -> Result<Url, QuoteviewError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| QuoteviewError::provider(symbol, format!("invalid base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| QuoteviewError::provider(symbol, "base url cannot carry a path"))?
            .pop_if_empty()
            .extend(&["v8", "finance", "chart", symbol]);
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn quote_summary_url(&self, symbol: &str) -> Result<Url, QuoteviewError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| QuoteviewError::provider(symbol, format!("invalid base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| QuoteviewError::provider(symbol, "base url cannot carry a path"))?
            .pop_if_empty()
            .extend(&["v10", "finance", "quoteSummary", symbol]);
        url.query_pairs_mut()
            .append_pair("modules", "assetProfile,summaryDetail,price");
        Ok(url)
    }

    fn get_quote_summary(&self, symbol: &str) -> Result<Option<SymbolProfile>, QuoteviewError> {
        let url = self.quote_summary_url(symbol)?;
        log::debug!("get_quote_summary | url: {}", url);

        let summary = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| QuoteviewError::provider(symbol, format!("request failed: {}", e)))?
            .json::<QuoteSummaryResponse>()
            .map_err(|e| {
                QuoteviewError::provider(symbol, format!("invalid quoteSummary response: {}", e))
            })?;

        profile_from_summary(symbol, summary)
    }

    fn get_chart(&self, symbol: &str, url: Url) -> Result<Option<ChartResult>, QuoteviewError> {
        log::debug!("get_chart | url: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| QuoteviewError::provider(symbol, format!("request failed: {}", e)))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| QuoteviewError::provider(symbol, format!("failed to read body: {}", e)))?;

        log::debug!("get_chart | status: {} | {} bytes", status, body.len());

        match parse_chart(symbol, &body) {
            Ok(result) => Ok(result),
            Err(e) if status.is_success() => Err(e),
            Err(_) => Err(QuoteviewError::provider(
                symbol,
                format!("HTTP {}", status),
            )),
        }
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    NaiveDateTime::from(date).and_utc().timestamp()
}

fn local_date(ts: i64, gmt_offset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts + gmt_offset, 0).map(|dt| dt.date_naive())
}

/// `Ok(None)` when the provider reports an unknown symbol.
fn parse_chart(symbol: &str, body: &str) -> Result<Option<ChartResult>, QuoteviewError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| QuoteviewError::provider(symbol, format!("invalid chart response: {}", e)))?;

    if let Some(error) = response.chart.error {
        if error.code == NOT_FOUND_CODE {
            log::debug!("parse_chart | {} | {}", symbol, error.description);
            return Ok(None);
        }
        return Err(QuoteviewError::provider(
            symbol,
            format!("{}: {}", error.code, error.description),
        ));
    }

    Ok(response.chart.result.and_then(|r| r.into_iter().next()))
}

fn records_from_chart(result: ChartResult) -> Vec<RawRecord> {
    let gmt_offset = result.meta.gmt_offset;
    let timestamps = result.timestamp.unwrap_or_default();

    let quote = result.indicators.quote.into_iter().next();
    let (closes, volumes) = match quote {
        Some(q) => (q.close.unwrap_or_default(), q.volume.unwrap_or_default()),
        None => (Vec::new(), Vec::new()),
    };
    let adj_closes = result
        .indicators
        .adj_close
        .and_then(|ac| ac.into_iter().next())
        .and_then(|ac| ac.adj_close)
        .unwrap_or_default();

    let mut dividends: HashMap<NaiveDate, f64> = HashMap::new();
    let mut splits: HashMap<NaiveDate, f64> = HashMap::new();
    if let Some(events) = result.events {
        for event in events.dividends.unwrap_or_default().into_values() {
            if let Some(date) = local_date(event.date, gmt_offset) {
                *dividends.entry(date).or_default() += event.amount;
            }
        }
        for event in events.splits.unwrap_or_default().into_values() {
            if let Some(date) = local_date(event.date, gmt_offset) {
                if event.denominator != 0.0 {
                    splits.insert(date, event.numerator / event.denominator);
                }
            }
        }
    }

    let mut records = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(close) = closes.get(i).copied().flatten() else {
            continue;
        };
        let Some(date) = local_date(ts, gmt_offset) else {
            continue;
        };
        records.push(RawRecord {
            date,
            close,
            adjusted_close: adj_closes.get(i).copied().flatten(),
            volume: volumes.get(i).copied().flatten().unwrap_or_default(),
            dividends: dividends.get(&date).copied().unwrap_or_default(),
            stock_splits: splits.get(&date).copied().unwrap_or_default(),
        });
    }
    records
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// `Ok(None)` when the provider reports an unknown symbol.
fn profile_from_summary(
    symbol: &str,
    response: QuoteSummaryResponse,
) -> Result<Option<SymbolProfile>, QuoteviewError> {
    let summary = response.quote_summary;
    if let Some(error) = summary.error {
        if error.code == NOT_FOUND_CODE {
            return Ok(None);
        }
        return Err(QuoteviewError::provider(
            symbol,
            format!("{}: {}", error.code, error.description),
        ));
    }

    let result = summary
        .result
        .and_then(|r| r.into_iter().next())
        .unwrap_or_default();
    let (display_name, market_price) = match result.price {
        Some(price) => (
            price.long_name.or(price.short_name),
            price.regular_market_price.raw,
        ),
        None => (None, None),
    };
    let bid = result.summary_detail.and_then(|d| d.bid.raw);

    Ok(Some(SymbolProfile {
        display_name,
        description: result
            .asset_profile
            .and_then(|a| a.long_business_summary)
            .filter(|d| !d.trim().is_empty()),
        current_bid_price: positive(bid).or(positive(market_price)),
    }))
}

fn profile_from_meta(meta: ChartMeta) -> SymbolProfile {
    SymbolProfile {
        display_name: meta.long_name.or(meta.short_name),
        description: None,
        current_bid_price: positive(meta.regular_market_price),
    }
}

impl MarketDataPort for YahooAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawRecord>, QuoteviewError> {
        let period_end = end_date.checked_add_days(Days::new(1)).unwrap_or(end_date);
        let url = self.chart_url(
            symbol,
            &[
                ("period1", unix_midnight(start_date).to_string()),
                ("period2", unix_midnight(period_end).to_string()),
                ("interval", "1d".to_string()),
                ("events", "div|split".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ],
        )?;

        match self.get_chart(symbol, url)? {
            Some(result) => Ok(records_from_chart(result)),
            None => Ok(Vec::new()),
        }
    }

    fn fetch_profile(&self, symbol: &str) -> Result<SymbolProfile, QuoteviewError> {
        match self.get_quote_summary(symbol) {
            Ok(Some(profile)) => return Ok(profile),
            Ok(None) => return Ok(SymbolProfile::default()),
            Err(e) => log::debug!("fetch_profile | {} | falling back to chart meta: {}", symbol, e),
        }

        let url = self.chart_url(
            symbol,
            &[
                ("range", "1d".to_string()),
                ("interval", "1d".to_string()),
            ],
        )?;

        match self.get_chart(symbol, url)? {
            Some(result) => Ok(profile_from_meta(result.meta)),
            None => Ok(SymbolProfile::default()),
        }
    }
}
