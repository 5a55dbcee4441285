//! CLI definition and dispatch.
//!
//! The shell owns all session state (the last rendered view, defaults from
//! the config file) and passes explicit requests into the domain pipeline.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::chart_svg::monthly_chart_svg;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::xlsx_export_adapter::XlsxExportAdapter;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::error::QuoteviewError;
use crate::domain::export::{export_filename, EXPORT_HEADERS};
use crate::domain::normalizer::normalize;
use crate::domain::view::{build_view, SymbolView, ViewRequest};
use crate::ports::config_port::ConfigPort;
use crate::ports::export_port::ExportPort;
use crate::ports::market_data_port::MarketDataPort;

/// First date requested when no start is given; matches the provider's
/// practical history horizon for most listings.
pub const DEFAULT_START: &str = "2000-01-01";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Parser, Debug)]
#[command(name = "quoteview", about = "Stock and index price viewer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show profile, performance and monthly prices for a symbol
    Show {
        #[arg(short, long)]
        symbol: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the monthly table to an .xlsx file
        #[arg(long)]
        export: bool,
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Write the monthly chart as SVG to this path
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Show the available data range for a symbol
    Info {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Read requests from stdin until `quit`
    Interactive {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let today = chrono::Local::now().date_naive();
    match cli.command {
        Command::Show {
            symbol,
            start,
            end,
            config,
            export,
            output_dir,
            chart,
        } => report_outcome(run_show(
            &symbol,
            start.as_deref(),
            end.as_deref(),
            config.as_ref(),
            export,
            output_dir.as_ref(),
            chart.as_ref(),
            today,
        )),
        Command::Info { symbol, config } => {
            report_outcome(run_info(&symbol, config.as_ref(), today))
        }
        Command::Interactive { config } => report_outcome(run_interactive(config.as_ref(), today)),
    }
}

fn report_outcome(result: Result<(), QuoteviewError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, QuoteviewError> {
    let Some(path) = path else {
        return Ok(FileConfigAdapter::empty());
    };
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| QuoteviewError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn build_market_data_port(
    config: &dyn ConfigPort,
) -> Result<Box<dyn MarketDataPort>, QuoteviewError> {
    let kind = config
        .get_string("provider", "kind")
        .unwrap_or_else(|| "yahoo".to_string());

    match kind.trim().to_lowercase().as_str() {
        "yahoo" => Ok(Box::new(YahooAdapter::from_config(config)?)),
        "csv" => {
            let data_dir = config.get_string("provider", "data_dir").ok_or_else(|| {
                QuoteviewError::ConfigMissing {
                    section: "provider".into(),
                    key: "data_dir".into(),
                }
            })?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(data_dir))))
        }
        other => Err(QuoteviewError::ConfigInvalid {
            section: "provider".into(),
            key: "kind".into(),
            reason: format!("unknown provider {:?} (expected yahoo or csv)", other),
        }),
    }
}

fn parse_date(section: &str, key: &str, value: &str) -> Result<NaiveDate, QuoteviewError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        QuoteviewError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: format!("invalid date {:?} (expected YYYY-MM-DD)", value),
        }
    })
}

/// Builds a request from user input. Without a start, data is fetched from
/// `[view] default_start` (or [`DEFAULT_START`]) and the displayed range
/// begins at the first available date. The end defaults to `today`.
pub fn resolve_request(
    symbol: &str,
    start: Option<&str>,
    end: Option<&str>,
    config: &dyn ConfigPort,
    today: NaiveDate,
) -> Result<ViewRequest, QuoteviewError> {
    if symbol.trim().is_empty() {
        return Err(QuoteviewError::ConfigInvalid {
            section: "request".into(),
            key: "symbol".into(),
            reason: "symbol must not be empty".into(),
        });
    }

    let start_date = match start {
        Some(s) => parse_date("request", "start", s)?,
        None => match config.get_string("view", "default_start") {
            Some(s) => parse_date("view", "default_start", &s)?,
            None => parse_date("view", "default_start", DEFAULT_START)?,
        },
    };
    let explicit_start = start.is_some();
    let end_date = match end {
        Some(s) => parse_date("request", "end", s)?,
        None => today,
    };

    if start_date > end_date {
        return Err(QuoteviewError::ConfigInvalid {
            section: "request".into(),
            key: "start".into(),
            reason: format!("start {} is after end {}", start_date, end_date),
        });
    }

    if explicit_start {
        Ok(ViewRequest::new(symbol, start_date, end_date))
    } else {
        Ok(ViewRequest::from_default_start(symbol, start_date, end_date))
    }
}

pub fn render_view<W: Write>(view: &SymbolView, out: &mut W) -> io::Result<()> {
    let profile = &view.profile;
    writeln!(out, "Name: {}", profile.display_name_or_na())?;
    writeln!(out, "{}", profile.description_or_default())?;
    writeln!(out, "Current Bid Price: {}", profile.bid_or_na())?;
    if let (Some(first), Some(last)) = (
        view.series.first_available_date(),
        view.series.last_date(),
    ) {
        writeln!(out, "Data: {} to {} ({} days)", first, last, view.series.len())?;
    }
    writeln!(out, "Range: {} to {}", view.range_start(), view.request.end)?;
    if view.series.used_close_fallback() {
        writeln!(
            out,
            "warning: Adj Close is not available for some dates; using Close instead."
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{} Performance", profile.display_name_or_na())?;
    for line in view.performance_lines() {
        writeln!(out, "{}", line)?;
    }

    writeln!(out)?;
    writeln!(out, "Monthly Performance")?;
    writeln!(
        out,
        "{:<16} {:>12} {:>10}",
        EXPORT_HEADERS[0], EXPORT_HEADERS[1], EXPORT_HEADERS[2]
    )?;
    for point in &view.monthly {
        let change = point
            .percent_change
            .map(|c| format!("{:.2}", c))
            .unwrap_or_default();
        writeln!(
            out,
            "{:<16} {:>12.2} {:>10}",
            point.formatted_label, point.adjusted_close, change
        )?;
    }
    Ok(())
}

/// Writes the monthly series under `output_dir` with the sanitized export
/// file name for the displayed range and returns the path written.
pub fn export_view(
    view: &SymbolView,
    exporter: &dyn ExportPort,
    output_dir: &Path,
) -> Result<PathBuf, QuoteviewError> {
    let filename = export_filename(
        &view.request.symbol,
        &view.range_start().format(DATE_FORMAT).to_string(),
        &view.request.end.format(DATE_FORMAT).to_string(),
    );
    let path = output_dir.join(filename);
    exporter.write_monthly(&view.request.symbol, &view.monthly, &path)?;
    Ok(path)
}

pub fn write_chart(view: &SymbolView, path: &Path) -> Result<(), QuoteviewError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, monthly_chart_svg(&view.request.symbol, &view.monthly))?;
    Ok(())
}

fn output_dir_from(flag: Option<&PathBuf>, config: &dyn ConfigPort) -> PathBuf {
    flag.cloned()
        .or_else(|| config.get_string("export", "output_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[allow(clippy::too_many_arguments)]
fn run_show(
    symbol: &str,
    start: Option<&str>,
    end: Option<&str>,
    config_path: Option<&PathBuf>,
    export: bool,
    output_dir: Option<&PathBuf>,
    chart: Option<&PathBuf>,
    today: NaiveDate,
) -> Result<(), QuoteviewError> {
    let config = load_config(config_path)?;
    let request = resolve_request(symbol, start, end, &config, today)?;
    let port = build_market_data_port(&config)?;

    eprintln!(
        "Fetching {} from {} to {}",
        request.symbol, request.start, request.end
    );
    let view = build_view(port.as_ref(), &request)?;

    let stdout = io::stdout();
    render_view(&view, &mut stdout.lock())?;

    if export || config.get_bool("export", "on_show", false) {
        let dir = output_dir_from(output_dir, &config);
        let path = export_view(&view, &XlsxExportAdapter::new(), &dir)?;
        eprintln!("\nData exported to: {}", path.display());
    }

    let chart_path = chart
        .cloned()
        .or_else(|| config.get_string("chart", "path").map(PathBuf::from));
    if let Some(path) = chart_path {
        write_chart(&view, &path)?;
        eprintln!("Chart written to: {}", path.display());
    }

    Ok(())
}

fn run_info(
    symbol: &str,
    config_path: Option<&PathBuf>,
    today: NaiveDate,
) -> Result<(), QuoteviewError> {
    let config = load_config(config_path)?;
    let request = resolve_request(symbol, None, None, &config, today)?;
    let port = build_market_data_port(&config)?;

    let raw = port.fetch_history(&request.symbol, request.start, request.end)?;
    let series = normalize(&raw, &request.symbol, request.start, request.end)?;

    if let (Some(first), Some(last)) = (series.first_available_date(), series.last_date()) {
        println!(
            "{}: {} days, {} to {}",
            request.symbol,
            series.len(),
            first,
            last
        );
    }
    if series.used_close_fallback() {
        eprintln!("warning: adjusted close missing for some dates");
    }
    Ok(())
}

fn run_interactive(config_path: Option<&PathBuf>, today: NaiveDate) -> Result<(), QuoteviewError> {
    let config = load_config(config_path)?;
    let port = build_market_data_port(&config)?;
    let exporter = XlsxExportAdapter::new();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let session = Session {
        port: port.as_ref(),
        exporter: &exporter,
        config: &config,
        today,
    };
    session.run(stdin.lock(), &mut stdout.lock())?;
    Ok(())
}

/// Line-oriented interactive shell. Each line is one of:
///
/// - `SYMBOL [START] [END]`: fetch and render a view
/// - `export [DIR]`: write the last view to an .xlsx file
/// - `chart PATH`: write the last view's chart as SVG
/// - `help`, `quit`, `exit`
///
/// Failures are printed and the session continues.
pub struct Session<'a> {
    pub port: &'a dyn MarketDataPort,
    pub exporter: &'a dyn ExportPort,
    pub config: &'a dyn ConfigPort,
    pub today: NaiveDate,
}

const SESSION_HELP: &str = "Commands:
  SYMBOL [START] [END]   show a symbol (dates as YYYY-MM-DD)
  export [DIR]           export the last view to .xlsx
  chart PATH             write the last view's chart as SVG
  quit                   leave the session";

impl Session<'_> {
    /// Returns the number of views rendered successfully.
    pub fn run<R: BufRead, W: Write>(&self, reader: R, out: &mut W) -> io::Result<usize> {
        let mut last_view: Option<SymbolView> = None;
        let mut rendered = 0usize;

        write!(out, "> ")?;
        out.flush()?;
        for line in reader.lines() {
            let line = line?;
            let tokens: Vec<&str> = line.split_whitespace().collect();

            match tokens.as_slice() {
                [] => {}
                [cmd] if cmd.eq_ignore_ascii_case("quit") || cmd.eq_ignore_ascii_case("exit") => {
                    break;
                }
                [cmd] if cmd.eq_ignore_ascii_case("help") => writeln!(out, "{}", SESSION_HELP)?,
                [cmd, rest @ ..] if cmd.eq_ignore_ascii_case("export") => {
                    match (&last_view, rest) {
                        (None, _) => writeln!(out, "error: nothing to export yet")?,
                        (Some(view), [dir]) => self.export(view, Path::new(dir), out)?,
                        (Some(view), []) => {
                            let dir = output_dir_from(None, self.config);
                            self.export(view, &dir, out)?
                        }
                        _ => writeln!(out, "error: usage: export [DIR]")?,
                    }
                }
                [cmd, rest @ ..] if cmd.eq_ignore_ascii_case("chart") => {
                    match (&last_view, rest) {
                        (None, _) => writeln!(out, "error: nothing to chart yet")?,
                        (Some(view), [path]) => match write_chart(view, Path::new(path)) {
                            Ok(()) => writeln!(out, "Chart written to: {}", path)?,
                            Err(e) => writeln!(out, "error: {e}")?,
                        },
                        _ => writeln!(out, "error: usage: chart PATH")?,
                    }
                }
                [symbol, dates @ ..] if dates.len() <= 2 => {
                    match self.show(symbol, dates.first().copied(), dates.get(1).copied()) {
                        Ok(view) => {
                            render_view(&view, out)?;
                            rendered += 1;
                            last_view = Some(view);
                        }
                        Err(e) => {
                            log::warn!("request for {} failed: {}", symbol, e);
                            writeln!(out, "error: {e}")?;
                        }
                    }
                }
                _ => writeln!(out, "error: usage: SYMBOL [START] [END]")?,
            }

            write!(out, "> ")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(rendered)
    }

    fn show(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<SymbolView, QuoteviewError> {
        let request = resolve_request(symbol, start, end, self.config, self.today)?;
        build_view(self.port, &request)
    }

    fn export<W: Write>(&self, view: &SymbolView, dir: &Path, out: &mut W) -> io::Result<()> {
        match export_view(view, self.exporter, dir) {
            Ok(path) => writeln!(out, "Data exported to: {}", path.display()),
            Err(e) => writeln!(out, "error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn request_defaults() {
        let config = FileConfigAdapter::empty();
        let req = resolve_request("aapl", None, None, &config, d(2024, 6, 1)).unwrap();
        assert_eq!(req.symbol, "AAPL");
        assert_eq!(req.start, d(2000, 1, 1));
        assert!(!req.explicit_start);
        assert_eq!(req.end, d(2024, 6, 1));
    }

    #[test]
    fn request_start_from_config() {
        let config = FileConfigAdapter::from_string("[view]\ndefault_start = 2015-03-02\n").unwrap();
        let req = resolve_request("SPY", None, Some("2020-01-31"), &config, d(2024, 6, 1)).unwrap();
        assert_eq!(req.start, d(2015, 3, 2));
        assert_eq!(req.end, d(2020, 1, 31));

        let req = resolve_request("SPY", Some("2018-01-02"), None, &config, d(2024, 6, 1)).unwrap();
        assert!(req.explicit_start);
    }

    #[test]
    fn request_rejects_bad_dates() {
        let config = FileConfigAdapter::empty();
        let err = resolve_request("SPY", Some("2020/01/01"), None, &config, d(2024, 6, 1))
            .unwrap_err();
        assert!(matches!(err, QuoteviewError::ConfigInvalid { key, .. } if key == "start"));

        let err = resolve_request("SPY", Some("2024-02-01"), Some("2024-01-01"), &config, d(2024, 6, 1))
            .unwrap_err();
        assert!(matches!(err, QuoteviewError::ConfigInvalid { reason, .. } if reason.contains("after")));
    }

    #[test]
    fn request_rejects_empty_symbol() {
        let config = FileConfigAdapter::empty();
        let err = resolve_request("  ", None, None, &config, d(2024, 6, 1)).unwrap_err();
        assert!(matches!(err, QuoteviewError::ConfigInvalid { key, .. } if key == "symbol"));
    }

    #[test]
    fn provider_kind_selection() {
        let csv = FileConfigAdapter::from_string("[provider]\nkind = csv\ndata_dir = /tmp\n").unwrap();
        assert!(build_market_data_port(&csv).is_ok());

        let missing_dir = FileConfigAdapter::from_string("[provider]\nkind = csv\n").unwrap();
        assert!(matches!(
            build_market_data_port(&missing_dir).err().unwrap(),
            QuoteviewError::ConfigMissing { key, .. } if key == "data_dir"
        ));

        let unknown = FileConfigAdapter::from_string("[provider]\nkind = bloomberg\n").unwrap();
        assert!(matches!(
            build_market_data_port(&unknown).err().unwrap(),
            QuoteviewError::ConfigInvalid { key, .. } if key == "kind"
        ));

        assert!(build_market_data_port(&FileConfigAdapter::empty()).is_ok());
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        let path = PathBuf::from("/nonexistent/quoteview.ini");
        let err = load_config(Some(&path)).err().unwrap();
        assert!(matches!(err, QuoteviewError::ConfigParse { .. }));
        assert_eq!(ExitCode::from(&err), ExitCode::from(2));
    }

    #[test]
    fn output_dir_precedence() {
        let config = FileConfigAdapter::from_string("[export]\noutput_dir = exports\n").unwrap();
        let flag = PathBuf::from("flagdir");
        assert_eq!(output_dir_from(Some(&flag), &config), PathBuf::from("flagdir"));
        assert_eq!(output_dir_from(None, &config), PathBuf::from("exports"));
        assert_eq!(
            output_dir_from(None, &FileConfigAdapter::empty()),
            PathBuf::from(".")
        );
    }

    #[test]
    fn cli_parses_show() {
        let cli = Cli::try_parse_from([
            "quoteview", "show", "--symbol", "^GSPC", "--start", "2020-01-01", "--export",
        ])
        .unwrap();
        match cli.command {
            Command::Show {
                symbol,
                start,
                export,
                chart,
                ..
            } => {
                assert_eq!(symbol, "^GSPC");
                assert_eq!(start.as_deref(), Some("2020-01-01"));
                assert!(export);
                assert!(chart.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
