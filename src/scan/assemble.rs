//! Final profile assembly.
//!
//! Joins each reconciled extension with its per-extension settings from
//! the preferences documents and resolves the profile display name.

use serde_json::Value;
use std::path::Path;
use tracing::{error, warn};

use crate::error::ScanError;
use crate::model::{BrowserType, CanonicalPath, ExtensionProperties, Profile, RawExtension};
use crate::scan::manifest;
use crate::scan::reconcile::{resolve_settings_path, settings_node, PathCache, ReconciledProfile};

/// Scalar settings copied verbatim from the matched settings entry.
const PROFILE_SETTINGS_KEYS: &[&str] = &["from_webstore", "state", "install_time"];

/// Renders a JSON scalar to its string form. Arrays and objects are not
/// settings values.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads the profile display name from a parsed preferences document.
/// An empty string is a present name, not an absent one.
fn profile_name(document: Option<&Value>) -> Option<String> {
    let name = document?.get("profile")?.get("name")?.as_str()?;
    Some(name.to_string())
}

/// Extracts profile-level settings for one extension from a parsed
/// preferences document.
///
/// The matched entry's container key becomes the synthesized `identifier`
/// setting; matching is by canonical path equality.
///
/// # Errors
///
/// Fails when the document has no settings node or no entry whose `path`
/// resolves to the extension's canonical path.
pub(crate) fn extension_settings(
    document: &Value,
    extension_path: &CanonicalPath,
    profile_path: &Path,
    cache: &mut PathCache,
) -> Result<ExtensionProperties, ScanError> {
    let missing = || ScanError::SettingsEntryMissing {
        path: extension_path.as_path().to_path_buf(),
    };

    let settings = settings_node(document).ok_or_else(missing)?;

    let (identifier, entry) = settings
        .iter()
        .find(|(_, entry)| {
            entry
                .get("path")
                .and_then(Value::as_str)
                .map(|raw| cache.resolve(resolve_settings_path(raw, profile_path)) == *extension_path)
                .unwrap_or(false)
        })
        .ok_or_else(missing)?;

    let mut output = ExtensionProperties::new();
    output.insert("identifier".to_string(), identifier.clone());

    for key in PROFILE_SETTINGS_KEYS {
        if let Some(value) = entry.get(*key).and_then(scalar_to_string) {
            output.insert((*key).to_string(), value);
        }
    }

    Ok(output)
}

/// Assembles the final profile from a reconciled snapshot.
///
/// # Errors
///
/// Fails when `profile.name` is absent from both documents for any
/// browser other than Opera, whose documents never carry the field.
pub fn assemble(reconciled: ReconciledProfile, cache: &mut PathCache) -> Result<Profile, ScanError> {
    let name = profile_name(reconciled.preferences.as_ref())
        .or_else(|| profile_name(reconciled.secure_preferences.as_ref()));

    let name = match name {
        Some(name) => name,
        None if reconciled.browser == BrowserType::Opera => String::new(),
        None => {
            return Err(ScanError::ProfileNameMissing {
                path: reconciled.path.as_path().to_path_buf(),
            })
        }
    };

    let mut extensions = Vec::new();

    let build = |raw: &RawExtension, referenced: bool| match manifest::build_extension(raw, referenced)
    {
        Ok(extension) => Some(extension),
        Err(err) => {
            error!(profile = %reconciled.path.display(), "failed to process extension: {err}");
            None
        }
    };

    let sorted_values = |map: std::collections::HashMap<CanonicalPath, RawExtension>| {
        let mut values: Vec<RawExtension> = map.into_values().collect();
        values.sort_by(|a, b| a.path.cmp(&b.path));
        values
    };

    for raw in sorted_values(reconciled.unreferenced) {
        if let Some(extension) = build(&raw, false) {
            extensions.push(extension);
        }
    }

    let documents = [&reconciled.preferences, &reconciled.secure_preferences];
    for raw in sorted_values(reconciled.referenced) {
        let Some(mut extension) = build(&raw, true) else {
            continue;
        };

        // Settings come from whichever document actually names this
        // extension; primary first, then secure.
        let settings = documents.iter().copied().flatten().find_map(|document| {
            extension_settings(document, &raw.path, reconciled.path.as_path(), cache).ok()
        });

        match settings {
            Some(settings) => extension.profile_settings = settings,
            None => warn!(
                extension = %raw.path.display(),
                profile = %reconciled.path.display(),
                "no preferences settings entry matches this extension"
            ),
        }

        extensions.push(extension);
    }

    Ok(Profile {
        browser: reconciled.browser,
        uid: reconciled.uid,
        path: reconciled.path,
        name,
        extensions,
    })
}
