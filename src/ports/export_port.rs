//! Spreadsheet export port.

use crate::domain::error::QuoteviewError;
use crate::domain::monthly::MonthlyPoint;
use std::path::Path;

/// Port for writing the monthly series to a file.
pub trait ExportPort {
    fn write_monthly(
        &self,
        symbol: &str,
        monthly: &[MonthlyPoint],
        output_path: &Path,
    ) -> Result<(), QuoteviewError>;
}
