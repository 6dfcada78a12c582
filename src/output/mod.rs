//! Output formats for scan results.

mod json;
mod rows;
mod table;

pub use json::print_json;
pub use rows::{content_script_rows, extension_rows, ContentScriptRow, ExtensionRow};
pub use table::print_table;

use anyhow::Result;

use crate::model::ScanReport;

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

pub fn print_report(
    report: &ScanReport,
    format: OutputFormat,
    show_content_scripts: bool,
) -> Result<()> {
    match format {
        OutputFormat::Table => table::print_table(report, show_content_scripts),
        OutputFormat::Json => json::print_json(report),
    }
}

/// Formats a report to a string for file output. Table output falls back
/// to JSON, which is the useful form in a file.
pub fn format_report_to_string(report: &ScanReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Table => json::generate_json_string(report),
    }
}
