use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

use super::rows::{content_script_rows, extension_rows};
use crate::model::ScanReport;

#[derive(Tabled)]
struct ExtensionTableRow {
    #[tabled(rename = "Browser")]
    browser: String,
    #[tabled(rename = "Profile")]
    profile: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Identifier")]
    identifier: String,
    #[tabled(rename = "Referenced")]
    referenced: String,
}

#[derive(Tabled)]
struct ContentScriptTableRow {
    #[tabled(rename = "Identifier")]
    identifier: String,
    #[tabled(rename = "Match")]
    match_pattern: String,
    #[tabled(rename = "Script")]
    script: String,
}

pub fn print_table(report: &ScanReport, show_content_scripts: bool) -> Result<()> {
    println!();
    println!(
        "Scan completed at: {}",
        report.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    let extensions = extension_rows(report);
    if extensions.is_empty() {
        println!("No extensions found.");
        return Ok(());
    }

    println!(
        "Found {} extensions in {} profiles:",
        extensions.len(),
        report.profiles.len()
    );
    println!();

    let rows: Vec<ExtensionTableRow> = extensions
        .iter()
        .map(|row| ExtensionTableRow {
            browser: row.browser_type.clone(),
            profile: truncate(&row.profile, 20),
            name: truncate(row.properties.get("name").map_or("-", String::as_str), 40),
            version: row.properties.get("version").cloned().unwrap_or_else(|| "-".into()),
            identifier: truncate(
                row.profile_settings.get("identifier").map_or("-", String::as_str),
                34,
            ),
            referenced: if row.referenced { "yes" } else { "no" }.to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);

    if show_content_scripts {
        let scripts = content_script_rows(report);
        if !scripts.is_empty() {
            println!();
            println!("Content script matches:");
            println!();

            let rows: Vec<ContentScriptTableRow> = scripts
                .iter()
                .map(|row| ContentScriptTableRow {
                    identifier: truncate(&row.identifier, 34),
                    match_pattern: truncate(&row.match_pattern, 40),
                    script: truncate(&row.script, 40),
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
        }
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("abcdefghijklmnop", 10), "abcdefg...");
    }
}
