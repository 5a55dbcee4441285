//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for quoteview.
#[derive(Debug, thiserror::Error)]
pub enum QuoteviewError {
    #[error("no price data for {symbol} between {start} and {end}; check the ticker symbol")]
    EmptyData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("market data provider error for {symbol}: {reason}")]
    Provider { symbol: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to export {path}: {reason}")]
    Export { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QuoteviewError {
    pub fn provider(symbol: &str, reason: impl Into<String>) -> Self {
        QuoteviewError::Provider {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether a fresh request for another symbol or window can still succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            QuoteviewError::EmptyData { .. } | QuoteviewError::Provider { .. }
        )
    }
}

impl From<&QuoteviewError> for std::process::ExitCode {
    fn from(err: &QuoteviewError) -> Self {
        let code: u8 = match err {
            QuoteviewError::Io(_) | QuoteviewError::Export { .. } => 1,
            QuoteviewError::ConfigParse { .. }
            | QuoteviewError::ConfigMissing { .. }
            | QuoteviewError::ConfigInvalid { .. } => 2,
            QuoteviewError::Provider { .. } => 3,
            QuoteviewError::EmptyData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
