//! Excel workbook adapter implementing ExportPort.
//!
//! One worksheet named after the symbol with the columns
//! `Formatted Date | Adj Close | % Change`. The first month has no change and
//! its cell is left blank.

use crate::domain::error::QuoteviewError;
use crate::domain::export::{sheet_name, EXPORT_HEADERS};
use crate::domain::monthly::MonthlyPoint;
use crate::ports::export_port::ExportPort;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::fs;
use std::path::Path;

pub struct XlsxExportAdapter;

impl XlsxExportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn build_workbook(symbol: &str, monthly: &[MonthlyPoint]) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let number = Format::new().set_num_format("0.00");

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(symbol))?;

        for (col, title) in EXPORT_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &header)?;
        }

        for (i, point) in monthly.iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet.write_string(row, 0, &point.formatted_label)?;
            worksheet.write_number_with_format(row, 1, point.adjusted_close, &number)?;
            if let Some(change) = point.percent_change {
                worksheet.write_number_with_format(row, 2, change, &number)?;
            }
        }

        worksheet.set_column_width(0, 16)?;
        worksheet.set_column_width(1, 12)?;
        worksheet.set_column_width(2, 12)?;

        Ok(workbook)
    }
}

impl Default for XlsxExportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportPort for XlsxExportAdapter {
    fn write_monthly(
        &self,
        symbol: &str,
        monthly: &[MonthlyPoint],
        output_path: &Path,
    ) -> Result<(), QuoteviewError> {
        let export_err = |e: XlsxError| QuoteviewError::Export {
            path: output_path.display().to_string(),
            reason: e.to_string(),
        };

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut workbook = Self::build_workbook(symbol, monthly).map_err(export_err)?;
        workbook.save(output_path).map_err(export_err)?;

        log::debug!(
            "write_monthly | {} | {} rows to {}",
            symbol,
            monthly.len(),
            output_path.display()
        );
        Ok(())
    }
}
