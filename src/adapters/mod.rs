//! Concrete adapter implementations for ports.

pub mod chart_svg;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod xlsx_export_adapter;
pub mod yahoo_adapter;
