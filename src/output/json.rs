use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::rows::{content_script_rows, extension_rows, ContentScriptRow, ExtensionRow};
use crate::model::ScanReport;

#[derive(Serialize)]
struct JsonReport {
    scan_time: DateTime<Utc>,
    extensions: Vec<ExtensionRow>,
    content_scripts: Vec<ContentScriptRow>,
}

pub fn generate_json_string(report: &ScanReport) -> Result<String> {
    let output = JsonReport {
        scan_time: report.scan_time,
        extensions: extension_rows(report),
        content_scripts: content_script_rows(report),
    };

    Ok(serde_json::to_string_pretty(&output)?)
}

pub fn print_json(report: &ScanReport) -> Result<()> {
    println!("{}", generate_json_string(report)?);
    Ok(())
}
