//! Flattened output rows.
//!
//! Consumers get one row per (profile, extension) pair, with every
//! extracted property and profile-settings key flattened into the row,
//! plus a separate row set for content-script (match, script) pairs.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::ScanReport;

/// One (profile, extension) output row.
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionRow {
    pub browser_type: String,
    pub uid: i64,
    pub profile: String,
    pub profile_path: String,
    pub referenced: bool,
    pub path: String,
    pub manifest_hash: String,
    /// Manifest schema fields, including the `*_json` list variants.
    #[serde(flatten)]
    pub properties: BTreeMap<String, String>,
    /// Preferences settings, including the synthesized `identifier`.
    #[serde(flatten)]
    pub profile_settings: BTreeMap<String, String>,
    pub manifest_json: String,
}

/// One content-script (match, script) output row.
#[derive(Debug, Clone, Serialize)]
pub struct ContentScriptRow {
    pub browser_type: String,
    pub uid: i64,
    pub profile_path: String,
    /// The owning extension's `identifier` setting; empty when no
    /// settings entry matched.
    pub identifier: String,
    pub path: String,
    #[serde(rename = "match")]
    pub match_pattern: String,
    pub script: String,
}

/// Flattens a report into extension rows, preserving profile and
/// extension order.
pub fn extension_rows(report: &ScanReport) -> Vec<ExtensionRow> {
    let mut rows = Vec::new();

    for profile in &report.profiles {
        for extension in &profile.extensions {
            rows.push(ExtensionRow {
                browser_type: profile.browser.as_str().to_string(),
                uid: profile.uid,
                profile: profile.name.clone(),
                profile_path: profile.path.as_path().to_string_lossy().into_owned(),
                referenced: extension.referenced,
                path: extension.path.as_path().to_string_lossy().into_owned(),
                manifest_hash: extension.manifest_hash.clone(),
                properties: extension.properties.clone(),
                profile_settings: extension.profile_settings.clone(),
                manifest_json: extension.manifest_json.clone(),
            });
        }
    }

    rows
}

/// Flattens a report into content-script rows, one per (match, script)
/// pair, preserving manifest order.
pub fn content_script_rows(report: &ScanReport) -> Vec<ContentScriptRow> {
    let mut rows = Vec::new();

    for profile in &report.profiles {
        for extension in &profile.extensions {
            let identifier = extension
                .profile_settings
                .get("identifier")
                .cloned()
                .unwrap_or_default();

            for entry in &extension.content_scripts {
                rows.push(ContentScriptRow {
                    browser_type: profile.browser.as_str().to_string(),
                    uid: profile.uid,
                    profile_path: profile.path.as_path().to_string_lossy().into_owned(),
                    identifier: identifier.clone(),
                    path: extension.path.as_path().to_string_lossy().into_owned(),
                    match_pattern: entry.match_pattern.clone(),
                    script: entry.script.clone(),
                });
            }
        }
    }

    rows
}
