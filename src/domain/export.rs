//! Export naming rules for the monthly spreadsheet.

const MAX_SHEET_NAME_LEN: usize = 31;

/// `"{symbol}_{start}_{end}.xlsx"` with `:` and `^` replaced by `_`.
///
/// Start and end are taken as already-rendered text so the caller decides the
/// date format.
pub fn export_filename(symbol: &str, start: &str, end: &str) -> String {
    format!("{}_{}_{}.xlsx", symbol, start, end).replace([':', '^'], "_")
}

/// Worksheet name for a symbol. Excel rejects `[ ] : * ? / \` and names over
/// 31 characters.
pub fn sheet_name(symbol: &str) -> String {
    let cleaned: String = symbol
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

pub const EXPORT_HEADERS: [&str; 3] = ["Formatted Date", "Adj Close", "% Change"];
