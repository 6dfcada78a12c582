//! Reconciliation of disk-discovered and preferences-referenced extensions.
//!
//! The preferences documents name the extensions a profile actually has
//! installed; the folder scan finds what is physically present. Matching
//! is by canonical path: a disk-discovered extension is moved from the
//! unreferenced set into the referenced set when a preferences entry names
//! it, and a referenced extension missing from the folder scan (e.g.
//! installed outside the profile) is synthesized by reading its manifest
//! directly.

use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ScanError;
use crate::fsutil;
use crate::model::{BrowserType, CanonicalPath, ProfileSnapshot, RawExtension};
use crate::scan::snapshot::{EXTENSIONS_DIR, MANIFEST_FILE};

/// Candidate names for the extension settings node, tried in order.
/// Opera historically used `opsettings`.
const SETTINGS_NODE_NAMES: &[&str] = &["settings", "opsettings"];

/// Per-invocation canonicalization cache.
///
/// The same raw path strings recur across both preferences documents and
/// the settings-matching pass; resolving each spelling once per scan
/// avoids repeated filesystem lookups. Never persisted between scans.
#[derive(Debug, Default)]
pub struct PathCache {
    resolved: HashMap<PathBuf, CanonicalPath>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, path: PathBuf) -> CanonicalPath {
        self.resolved
            .entry(path)
            .or_insert_with_key(|p| CanonicalPath::resolve(p))
            .clone()
    }
}

/// A snapshot whose documents parsed successfully and whose extension sets
/// have been partitioned into referenced and unreferenced.
#[derive(Debug)]
pub struct ReconciledProfile {
    pub browser: BrowserType,
    pub uid: i64,
    pub path: CanonicalPath,
    pub preferences: Option<Value>,
    pub secure_preferences: Option<Value>,
    pub referenced: HashMap<CanonicalPath, RawExtension>,
    pub unreferenced: HashMap<CanonicalPath, RawExtension>,
}

/// Parses one preferences document. An absent document yields `None`; a
/// present document that fails to parse is fatal to the profile.
fn parse_document(
    bytes: &[u8],
    document: &'static str,
    profile_path: &Path,
) -> Result<Option<Value>, ScanError> {
    if bytes.is_empty() {
        return Ok(None);
    }

    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|source| ScanError::PreferencesParse {
            document,
            path: profile_path.to_path_buf(),
            source,
        })
}

/// Returns the extension settings object from a parsed preferences
/// document, trying each historical node name in order.
pub(crate) fn settings_node(document: &Value) -> Option<&serde_json::Map<String, Value>> {
    let extensions = document.get("extensions")?;
    SETTINGS_NODE_NAMES
        .iter()
        .find_map(|name| extensions.get(*name))
        .and_then(Value::as_object)
}

/// Resolves a settings entry's `path` value, which is either absolute or
/// relative to the profile's `Extensions` folder.
pub(crate) fn resolve_settings_path(raw: &str, profile_path: &Path) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        profile_path.join(EXTENSIONS_DIR).join(path)
    }
}

/// Collects the canonical paths referenced by one parsed document.
/// Absence of the settings node yields an empty list.
fn referenced_paths(
    document: &Value,
    profile_path: &Path,
    cache: &mut PathCache,
) -> Vec<CanonicalPath> {
    let Some(settings) = settings_node(document) else {
        return Vec::new();
    };

    settings
        .values()
        .filter_map(|entry| entry.get("path").and_then(Value::as_str))
        .map(|raw| cache.resolve(resolve_settings_path(raw, profile_path)))
        .collect()
}

/// Partitions a snapshot's extensions into referenced and unreferenced.
///
/// # Errors
///
/// Fails the profile when a non-empty preferences document cannot be
/// parsed. A referenced-but-missing extension whose manifest cannot be
/// read is dropped silently (debug log) without affecting the profile.
pub fn reconcile(
    snapshot: ProfileSnapshot,
    cache: &mut PathCache,
) -> Result<ReconciledProfile, ScanError> {
    let profile_path = snapshot.path.as_path();

    let preferences = parse_document(&snapshot.preferences, "Preferences", profile_path)?;
    let secure_preferences =
        parse_document(&snapshot.secure_preferences, "Secure Preferences", profile_path)?;

    let mut referenced_list = Vec::new();
    for document in [&preferences, &secure_preferences].into_iter().flatten() {
        referenced_list.extend(referenced_paths(document, profile_path, cache));
    }

    let mut referenced = snapshot.referenced;
    let mut unreferenced = snapshot.unreferenced;

    for path in referenced_list {
        if let Some(extension) = unreferenced.remove(&path) {
            referenced.insert(path, extension);
        } else if !referenced.contains_key(&path) {
            // Referenced but not found by the folder scan; synthesize it
            // from its manifest if the file is readable.
            match fsutil::read_file_best_effort(&path.join(MANIFEST_FILE)) {
                Ok(manifest) => {
                    referenced.insert(
                        path.clone(),
                        RawExtension {
                            path,
                            manifest,
                        },
                    );
                }
                Err(err) => {
                    debug!(
                        extension = %path.display(),
                        profile = %snapshot.path.display(),
                        "failed to read the manifest.json file of a referenced extension: {err}"
                    );
                }
            }
        }
    }

    Ok(ReconciledProfile {
        browser: snapshot.browser,
        uid: snapshot.uid,
        path: snapshot.path,
        preferences,
        secure_preferences,
        referenced,
        unreferenced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::locator::PREFERENCES_FILE;
    use crate::scan::snapshot;
    use std::fs;

    fn snapshot_for(dir: &Path) -> ProfileSnapshot {
        let location = crate::model::ProfileLocation {
            browser: BrowserType::GoogleChrome,
            uid: 1000,
            path: CanonicalPath::resolve(dir),
        };
        snapshot::capture(&location).unwrap()
    }

    fn write_extension(profile: &Path, id: &str, version: &str) -> CanonicalPath {
        let folder = profile.join(EXTENSIONS_DIR).join(id).join(version);
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join(MANIFEST_FILE), b"{\"name\":\"demo\"}").unwrap();
        CanonicalPath::resolve(&folder)
    }

    fn preferences_referencing(paths: &[&str], node: &str) -> String {
        let entries: Vec<String> = paths
            .iter()
            .enumerate()
            .map(|(i, p)| format!("\"ext{i}\": {{\"path\": {}}}", serde_json::to_string(p).unwrap()))
            .collect();
        format!("{{\"extensions\": {{\"{node}\": {{{}}}}}}}", entries.join(", "))
    }

    #[test]
    fn test_disk_extension_moves_to_referenced() {
        let dir = tempfile::tempdir().unwrap();
        let ext = write_extension(dir.path(), "abc123", "1.0_0");
        let prefs = preferences_referencing(&[ext.as_path().to_str().unwrap()], "settings");
        fs::write(dir.path().join(PREFERENCES_FILE), prefs).unwrap();

        let reconciled = reconcile(snapshot_for(dir.path()), &mut PathCache::new()).unwrap();

        assert!(reconciled.unreferenced.is_empty());
        assert_eq!(reconciled.referenced.len(), 1);
        assert_eq!(
            reconciled.referenced.get(&ext).unwrap().manifest,
            b"{\"name\":\"demo\"}"
        );
    }

    #[test]
    fn test_relative_path_resolves_against_extensions_folder() {
        let dir = tempfile::tempdir().unwrap();
        let ext = write_extension(dir.path(), "abc123", "1.0_0");
        let prefs = preferences_referencing(&["abc123/1.0_0"], "settings");
        fs::write(dir.path().join(PREFERENCES_FILE), prefs).unwrap();

        let reconciled = reconcile(snapshot_for(dir.path()), &mut PathCache::new()).unwrap();
        assert!(reconciled.referenced.contains_key(&ext));
    }

    #[test]
    fn test_opsettings_node_reconciles_identically() {
        let dir = tempfile::tempdir().unwrap();
        let ext = write_extension(dir.path(), "abc123", "1.0_0");
        let prefs = preferences_referencing(&["abc123/1.0_0"], "opsettings");
        fs::write(dir.path().join(PREFERENCES_FILE), prefs).unwrap();

        let reconciled = reconcile(snapshot_for(dir.path()), &mut PathCache::new()).unwrap();
        assert!(reconciled.referenced.contains_key(&ext));
        assert!(reconciled.unreferenced.is_empty());
    }

    #[test]
    fn test_reference_only_extension_is_synthesized_when_readable() {
        let dir = tempfile::tempdir().unwrap();

        // An extension installed outside the profile folder.
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join(MANIFEST_FILE), b"{\"name\":\"external\"}").unwrap();
        let outside_path = CanonicalPath::resolve(outside.path());

        let prefs =
            preferences_referencing(&[outside_path.as_path().to_str().unwrap()], "settings");
        fs::write(dir.path().join(PREFERENCES_FILE), prefs).unwrap();

        let reconciled = reconcile(snapshot_for(dir.path()), &mut PathCache::new()).unwrap();
        assert_eq!(reconciled.referenced.len(), 1);
        assert_eq!(
            reconciled.referenced.get(&outside_path).unwrap().manifest,
            b"{\"name\":\"external\"}"
        );
    }

    #[test]
    fn test_reference_without_manifest_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = preferences_referencing(&["/does/not/exist"], "settings");
        fs::write(dir.path().join(PREFERENCES_FILE), prefs).unwrap();

        let reconciled = reconcile(snapshot_for(dir.path()), &mut PathCache::new()).unwrap();
        assert!(reconciled.referenced.is_empty());
        assert!(reconciled.unreferenced.is_empty());
    }

    #[test]
    fn test_duplicate_references_consume_the_extension_once() {
        let dir = tempfile::tempdir().unwrap();
        let ext = write_extension(dir.path(), "abc123", "1.0_0");
        let prefs = preferences_referencing(&["abc123/1.0_0"], "settings");
        fs::write(dir.path().join(PREFERENCES_FILE), &prefs).unwrap();
        // The secure document references the same path a second time.
        fs::write(dir.path().join("Secure Preferences"), &prefs).unwrap();

        let reconciled = reconcile(snapshot_for(dir.path()), &mut PathCache::new()).unwrap();
        assert_eq!(reconciled.referenced.len(), 1);
        assert!(reconciled.referenced.contains_key(&ext));
        assert!(reconciled.unreferenced.is_empty());
    }

    #[test]
    fn test_unparsable_document_fails_the_profile() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PREFERENCES_FILE), b"not json").unwrap();

        let result = reconcile(snapshot_for(dir.path()), &mut PathCache::new());
        assert!(matches!(result, Err(ScanError::PreferencesParse { .. })));
    }

    #[test]
    fn test_missing_settings_node_leaves_everything_unreferenced() {
        let dir = tempfile::tempdir().unwrap();
        let ext = write_extension(dir.path(), "abc123", "1.0_0");
        fs::write(dir.path().join(PREFERENCES_FILE), b"{\"extensions\": {}}").unwrap();

        let reconciled = reconcile(snapshot_for(dir.path()), &mut PathCache::new()).unwrap();
        assert!(reconciled.referenced.is_empty());
        assert!(reconciled.unreferenced.contains_key(&ext));
    }
}
