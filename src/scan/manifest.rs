//! Manifest property extraction, localization, and digests.
//!
//! A fixed, declarative schema drives the extraction: each entry names a
//! tree path in the manifest, an output key, and a value shape. List
//! fields produce both a comma-joined human-readable value and a `_json`
//! re-serialization of the original list.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::warn;

use crate::error::ScanError;
use crate::fsutil;
use crate::model::{ContentScriptEntry, Extension, ExtensionProperties, RawExtension};

/// The prefix that identifies localized placeholder strings.
const LOCALIZED_MESSAGE_PREFIX: &str = "__MSG_";

/// Locale assumed when the manifest declares none.
const FALLBACK_LOCALE: &str = "en";

/// Value shape of a schema field.
enum PropertyShape {
    Scalar,
    List,
}

/// One manifest field to copy: tree path, output key, shape.
struct PropertySpec {
    path: &'static str,
    name: &'static str,
    shape: PropertyShape,
}

#[rustfmt::skip]
const PROPERTY_SCHEMA: &[PropertySpec] = &[
    PropertySpec { path: "name", name: "name", shape: PropertyShape::Scalar },
    PropertySpec { path: "update_url", name: "update_url", shape: PropertyShape::Scalar },
    PropertySpec { path: "version", name: "version", shape: PropertyShape::Scalar },
    PropertySpec { path: "author", name: "author", shape: PropertyShape::Scalar },
    PropertySpec { path: "default_locale", name: "default_locale", shape: PropertyShape::Scalar },
    PropertySpec { path: "current_locale", name: "current_locale", shape: PropertyShape::Scalar },
    PropertySpec { path: "background.persistent", name: "persistent", shape: PropertyShape::Scalar },
    PropertySpec { path: "description", name: "description", shape: PropertyShape::Scalar },
    PropertySpec { path: "permissions", name: "permissions", shape: PropertyShape::List },
    PropertySpec { path: "optional_permissions", name: "optional_permissions", shape: PropertyShape::List },
];

/// Walks a dot-separated tree path inside a parsed document.
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |node, key| node.get(key))
}

/// Extracts the fixed property schema from a parsed manifest.
///
/// Scalar fields with a missing node or non-string leaf are skipped, never
/// defaulted. List fields always emit both the joined value and the
/// `_json` variant when the node exists.
pub fn extract_properties(manifest: &Value) -> ExtensionProperties {
    let mut properties = ExtensionProperties::new();

    for spec in PROPERTY_SCHEMA {
        let Some(node) = lookup(manifest, spec.path) else {
            continue;
        };

        match spec.shape {
            PropertyShape::Scalar => {
                if let Some(value) = node.as_str() {
                    properties.insert(spec.name.to_string(), value.to_string());
                }
            }
            PropertyShape::List => {
                let values: Vec<&str> = node
                    .as_array()
                    .map(|items| items.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();

                properties.insert(spec.name.to_string(), values.join(", "));
                properties.insert(
                    format!("{}_json", spec.name),
                    serde_json::to_string(node).unwrap_or_default(),
                );
            }
        }
    }

    properties
}

/// Resolves one `__MSG_*__` placeholder against a parsed message document.
///
/// The lookup tries the exact key first, then the lowercased key; message
/// keys are case-insensitive in practice.
fn resolve_message(messages: &Value, placeholder: &str) -> Option<String> {
    // The prefix and the closing "__" are stripped exactly once; a key
    // that itself ends in "__" keeps its trailing underscores.
    let key = placeholder
        .strip_prefix(LOCALIZED_MESSAGE_PREFIX)
        .unwrap_or(placeholder);
    let key = key.strip_suffix("__").unwrap_or(key);

    messages
        .get(key)
        .or_else(|| messages.get(key.to_lowercase()))
        .and_then(|node| node.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Resolves placeholder-prefixed property values in place.
///
/// The locale is taken from `default_locale`, then `current_locale`, else
/// assumed to be `"en"`. When no property uses the placeholder prefix the
/// message document is never loaded.
///
/// # Errors
///
/// Fails when the locale's message document cannot be read or parsed; the
/// properties keep their unresolved placeholder values. An individual key
/// that cannot be resolved is logged and left unresolved without failing
/// the rest.
pub fn localize_properties(
    properties: &mut ExtensionProperties,
    extension_path: &Path,
) -> Result<(), ScanError> {
    let needs_localization = properties
        .values()
        .any(|value| value.starts_with(LOCALIZED_MESSAGE_PREFIX));
    if !needs_localization {
        return Ok(());
    }

    let locale = properties
        .get("default_locale")
        .or_else(|| properties.get("current_locale"))
        .cloned()
        .unwrap_or_else(|| FALLBACK_LOCALE.to_string());

    let messages_path = extension_path
        .join("_locales")
        .join(&locale)
        .join("messages.json");

    let messages: Value = fsutil::read_file_best_effort(&messages_path)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or_else(|| ScanError::LocalizationUnavailable {
            locale: locale.clone(),
            path: extension_path.to_path_buf(),
        })?;

    for value in properties.values_mut() {
        if !value.starts_with(LOCALIZED_MESSAGE_PREFIX) {
            continue;
        }

        match resolve_message(&messages, value) {
            Some(resolved) => *value = resolved,
            None => warn!(
                extension = %extension_path.display(),
                "failed to localize string '{value}'"
            ),
        }
    }

    Ok(())
}

/// Emits the ordered cross-product of each `content_scripts` entry's
/// `matches` and `js` lists. Entries missing either list are skipped.
pub fn content_script_matches(manifest: &Value) -> Vec<ContentScriptEntry> {
    let Some(entries) = manifest.get("content_scripts").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut output = Vec::new();
    for entry in entries {
        let Some(matches) = entry.get("matches").and_then(Value::as_array) else {
            continue;
        };
        let Some(scripts) = entry.get("js").and_then(Value::as_array) else {
            continue;
        };

        for match_pattern in matches.iter().filter_map(Value::as_str) {
            for script in scripts.iter().filter_map(Value::as_str) {
                output.push(ContentScriptEntry {
                    match_pattern: match_pattern.to_string(),
                    script: script.to_string(),
                });
            }
        }
    }

    output
}

/// SHA-256 digest of the raw manifest bytes, as lowercase hex. Used for
/// stable identity and reporting, not for security decisions.
pub fn manifest_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Builds a resolved extension from its raw snapshot.
///
/// Profile settings are left empty here; the assembler joins them in from
/// the preferences documents.
///
/// # Errors
///
/// Fails when the manifest does not parse. Localization failure is soft:
/// it is logged and the placeholder values are kept.
pub fn build_extension(raw: &RawExtension, referenced: bool) -> Result<Extension, ScanError> {
    let manifest_hash = manifest_digest(&raw.manifest);

    let parsed: Value =
        serde_json::from_slice(&raw.manifest).map_err(|source| ScanError::ManifestParse {
            path: raw.path.as_path().to_path_buf(),
            source,
        })?;

    let mut properties = extract_properties(&parsed);
    if let Err(err) = localize_properties(&mut properties, raw.path.as_path()) {
        warn!("{err}");
    }

    let content_scripts = content_script_matches(&parsed);
    let manifest_json = serde_json::to_string(&parsed).unwrap_or_default();

    Ok(Extension {
        path: raw.path.clone(),
        manifest_hash,
        manifest_json,
        properties,
        profile_settings: ExtensionProperties::new(),
        content_scripts,
        referenced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalPath;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_extract_scalar_properties() {
        let manifest = json!({
            "name": "Demo",
            "version": "1.2.3",
            "description": "A demo",
            "background": { "persistent": "true" },
            "homepage_url": "https://example.com"
        });

        let properties = extract_properties(&manifest);
        assert_eq!(properties.get("name").unwrap(), "Demo");
        assert_eq!(properties.get("version").unwrap(), "1.2.3");
        assert_eq!(properties.get("persistent").unwrap(), "true");
        // Not part of the schema.
        assert!(!properties.contains_key("homepage_url"));
    }

    #[test]
    fn test_non_string_scalar_is_skipped_not_defaulted() {
        let manifest = json!({ "name": 42, "version": "1.0" });
        let properties = extract_properties(&manifest);
        assert!(!properties.contains_key("name"));
        assert_eq!(properties.get("version").unwrap(), "1.0");
    }

    #[test]
    fn test_list_properties_emit_joined_and_json_variants() {
        let manifest = json!({ "permissions": ["tabs", "storage", "cookies"] });
        let properties = extract_properties(&manifest);

        assert_eq!(properties.get("permissions").unwrap(), "tabs, storage, cookies");

        // The _json variant re-parses to the same ordered string list.
        let reparsed: Vec<String> =
            serde_json::from_str(properties.get("permissions_json").unwrap()).unwrap();
        assert_eq!(reparsed, vec!["tabs", "storage", "cookies"]);
    }

    #[test]
    fn test_missing_list_node_emits_nothing() {
        let properties = extract_properties(&json!({}));
        assert!(!properties.contains_key("permissions"));
        assert!(!properties.contains_key("permissions_json"));
    }

    #[test]
    fn test_localization_resolves_placeholders() {
        let ext = tempfile::tempdir().unwrap();
        let locale_dir = ext.path().join("_locales").join("en");
        fs::create_dir_all(&locale_dir).unwrap();
        fs::write(
            locale_dir.join("messages.json"),
            b"{\"foo\": {\"message\": \"Hello\"}}",
        )
        .unwrap();

        let mut properties = ExtensionProperties::new();
        properties.insert("name".into(), "__MSG_foo__".into());
        properties.insert("description".into(), "plain text".into());
        properties.insert("version".into(), "__MSG_missing__".into());

        localize_properties(&mut properties, ext.path()).unwrap();

        assert_eq!(properties.get("name").unwrap(), "Hello");
        // Non-placeholder values are untouched.
        assert_eq!(properties.get("description").unwrap(), "plain text");
        // An unresolvable key keeps its placeholder.
        assert_eq!(properties.get("version").unwrap(), "__MSG_missing__");
    }

    #[test]
    fn test_placeholder_delimiters_strip_once() {
        let messages = json!({
            "foo__": { "message": "Trailing" },
            "foo": { "message": "Plain" }
        });

        // "__MSG_foo____" names the key "foo__", not "foo".
        assert_eq!(
            resolve_message(&messages, "__MSG_foo____").unwrap(),
            "Trailing"
        );
        assert_eq!(resolve_message(&messages, "__MSG_foo__").unwrap(), "Plain");
    }

    #[test]
    fn test_localization_prefers_default_locale() {
        let ext = tempfile::tempdir().unwrap();
        let locale_dir = ext.path().join("_locales").join("de");
        fs::create_dir_all(&locale_dir).unwrap();
        fs::write(
            locale_dir.join("messages.json"),
            b"{\"foo\": {\"message\": \"Hallo\"}}",
        )
        .unwrap();

        let mut properties = ExtensionProperties::new();
        properties.insert("default_locale".into(), "de".into());
        properties.insert("name".into(), "__MSG_foo__".into());

        localize_properties(&mut properties, ext.path()).unwrap();
        assert_eq!(properties.get("name").unwrap(), "Hallo");
    }

    #[test]
    fn test_localization_failure_keeps_placeholders() {
        let ext = tempfile::tempdir().unwrap();

        let mut properties = ExtensionProperties::new();
        properties.insert("name".into(), "__MSG_foo__".into());

        let result = localize_properties(&mut properties, ext.path());
        assert!(matches!(result, Err(ScanError::LocalizationUnavailable { .. })));
        assert_eq!(properties.get("name").unwrap(), "__MSG_foo__");
    }

    #[test]
    fn test_localization_not_needed_skips_message_load() {
        let ext = tempfile::tempdir().unwrap();

        let mut properties = ExtensionProperties::new();
        properties.insert("name".into(), "plain".into());

        // No _locales directory exists, yet this must succeed.
        localize_properties(&mut properties, ext.path()).unwrap();
    }

    #[test]
    fn test_content_script_cross_product_preserves_order() {
        let manifest = json!({
            "content_scripts": [
                { "matches": ["*://a/*", "*://b/*"], "js": ["one.js", "two.js"] },
                { "matches": ["*://c/*"] },
                { "js": ["ignored.js"] },
                { "matches": ["*://d/*"], "js": ["three.js"] }
            ]
        });

        let entries = content_script_matches(&manifest);
        let pairs: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.match_pattern.as_str(), e.script.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("*://a/*", "one.js"),
                ("*://a/*", "two.js"),
                ("*://b/*", "one.js"),
                ("*://b/*", "two.js"),
                ("*://d/*", "three.js"),
            ]
        );
    }

    #[test]
    fn test_manifest_digest_is_sha256_hex() {
        assert_eq!(
            manifest_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_build_extension_rejects_unparsable_manifest() {
        let raw = RawExtension {
            path: CanonicalPath::resolve("/tmp/ext"),
            manifest: b"not json".to_vec(),
        };
        assert!(matches!(
            build_extension(&raw, false),
            Err(ScanError::ManifestParse { .. })
        ));
    }

    #[test]
    fn test_build_extension_resolves_everything() {
        let ext = tempfile::tempdir().unwrap();
        let manifest = serde_json::to_vec(&json!({
            "name": "Demo",
            "version": "1.0",
            "permissions": ["tabs"],
            "content_scripts": [{ "matches": ["<all_urls>"], "js": ["inject.js"] }]
        }))
        .unwrap();

        let raw = RawExtension {
            path: CanonicalPath::resolve(ext.path()),
            manifest: manifest.clone(),
        };

        let extension = build_extension(&raw, true).unwrap();
        assert!(extension.referenced);
        assert_eq!(extension.manifest_hash, manifest_digest(&manifest));
        assert_eq!(extension.properties.get("name").unwrap(), "Demo");
        assert_eq!(extension.content_scripts.len(), 1);
        assert!(extension.profile_settings.is_empty());

        // The re-rendered manifest parses back to the original document.
        let reparsed: Value = serde_json::from_str(&extension.manifest_json).unwrap();
        assert_eq!(reparsed, serde_json::from_slice::<Value>(&manifest).unwrap());
    }
}
