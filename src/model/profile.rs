use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::BrowserType;

/// A filesystem path resolved to its unique, symlink-free form.
///
/// The same extension folder can be reachable through several string
/// spellings; identity matching between the on-disk scan and the
/// preferences documents therefore compares canonical paths only.
/// Equality and hashing are defined on the resolved form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CanonicalPath(PathBuf);

impl CanonicalPath {
    /// Canonicalizes `path`, falling back to the path as given when
    /// resolution fails (e.g. the path does not exist). Never errors.
    pub fn resolve(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::canonicalize(path) {
            Ok(resolved) => CanonicalPath(resolved),
            Err(_) => CanonicalPath(path.to_path_buf()),
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn join(&self, component: impl AsRef<Path>) -> PathBuf {
        self.0.join(component)
    }

    pub fn display(&self) -> std::path::Display<'_> {
        self.0.display()
    }
}

/// A user account that may own browser profiles.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub uid: i64,
    pub home: PathBuf,
}

/// A validated profile directory, before any of its contents are read.
#[derive(Debug, Clone)]
pub struct ProfileLocation {
    pub browser: BrowserType,
    pub uid: i64,
    pub path: CanonicalPath,
}

/// An extension folder discovered on disk, identified by canonical path.
#[derive(Debug, Clone)]
pub struct RawExtension {
    pub path: CanonicalPath,
    pub manifest: Vec<u8>,
}

/// Point-in-time capture of one profile: both preferences documents as raw
/// bytes plus every extension folder found under `Extensions/`.
///
/// The two extension maps are disjoint by key. Every extension starts in
/// `unreferenced` and is moved (never copied) into `referenced` once a
/// matching path is found in either preferences document.
#[derive(Debug)]
pub struct ProfileSnapshot {
    pub browser: BrowserType,
    pub uid: i64,
    pub path: CanonicalPath,
    pub preferences: Vec<u8>,
    pub secure_preferences: Vec<u8>,
    pub referenced: HashMap<CanonicalPath, RawExtension>,
    pub unreferenced: HashMap<CanonicalPath, RawExtension>,
}

/// Flat string properties extracted from a manifest, keyed by output name.
pub type ExtensionProperties = BTreeMap<String, String>;

/// One (URL match pattern, script path) pair declared by a manifest's
/// `content_scripts` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentScriptEntry {
    #[serde(rename = "match")]
    pub match_pattern: String,
    pub script: String,
}

/// A fully resolved extension, ready for output.
#[derive(Debug, Clone, Serialize)]
pub struct Extension {
    pub path: CanonicalPath,
    pub manifest_hash: String,
    /// The manifest re-rendered as compact JSON.
    pub manifest_json: String,
    pub properties: ExtensionProperties,
    /// Per-extension settings copied from the preferences document,
    /// including the synthesized `identifier` key. Empty when no settings
    /// entry matched.
    pub profile_settings: ExtensionProperties,
    pub content_scripts: Vec<ContentScriptEntry>,
    /// True when the extension's path appears in a preferences document.
    pub referenced: bool,
}

/// A resolved browser profile and its extensions.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub browser: BrowserType,
    pub uid: i64,
    pub path: CanonicalPath,
    /// Display name from `profile.name`; empty for Opera profiles, which
    /// never carry one.
    pub name: String,
    pub extensions: Vec<Extension>,
}

/// Complete results of one scan invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan_time: DateTime<Utc>,
    pub profiles: Vec<Profile>,
}

impl ScanReport {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            scan_time: Utc::now(),
            profiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_path_resolves_symlink_free_form() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = CanonicalPath::resolve(dir.path());
        assert_eq!(resolved.as_path(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_canonical_path_falls_back_on_missing_path() {
        let missing = PathBuf::from("/does/not/exist/anywhere");
        let resolved = CanonicalPath::resolve(&missing);
        assert_eq!(resolved.as_path(), missing.as_path());
    }

    #[test]
    fn test_canonical_path_identity_ignores_spelling() {
        let dir = tempfile::tempdir().unwrap();
        let via_dot = dir.path().join(".");
        assert_eq!(CanonicalPath::resolve(dir.path()), CanonicalPath::resolve(&via_dot));
    }
}
