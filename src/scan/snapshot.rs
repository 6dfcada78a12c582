//! Point-in-time profile capture.
//!
//! Reads both preferences documents and enumerates the on-disk extension
//! folders of one located profile. Every discovered extension starts out
//! unreferenced; reconciliation against the preferences documents happens
//! in a later pass.

use std::collections::HashMap;
use tracing::error;
use walkdir::WalkDir;

use crate::error::ScanError;
use crate::fsutil;
use crate::model::{CanonicalPath, ProfileLocation, ProfileSnapshot, RawExtension};
use crate::scan::locator::{PREFERENCES_FILE, SECURE_PREFERENCES_FILE};

/// The extension metadata document inside each extension folder.
pub const MANIFEST_FILE: &str = "manifest.json";

/// The folder holding installed extensions inside each profile.
pub const EXTENSIONS_DIR: &str = "Extensions";

/// Captures a snapshot of the given profile.
///
/// Either preferences document may be absent; the profile is dropped only
/// when both are empty or unreadable. An unreadable extension manifest
/// drops that extension alone.
pub fn capture(location: &ProfileLocation) -> Result<ProfileSnapshot, ScanError> {
    let preferences =
        fsutil::read_file_best_effort(&location.path.join(PREFERENCES_FILE)).unwrap_or_default();
    let secure_preferences = fsutil::read_file_best_effort(&location.path.join(SECURE_PREFERENCES_FILE))
        .unwrap_or_default();

    if preferences.is_empty() && secure_preferences.is_empty() {
        return Err(ScanError::PreferencesUnreadable {
            path: location.path.as_path().to_path_buf(),
        });
    }

    let mut unreferenced = HashMap::new();

    // Extension folders sit two levels below Extensions: one directory per
    // extension id, one per installed browser version.
    let extensions_root = location.path.join(EXTENSIONS_DIR);
    for entry in WalkDir::new(&extensions_root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .flatten()
    {
        if !entry.file_type().is_dir() {
            continue;
        }

        let extension_path = CanonicalPath::resolve(entry.path());
        let manifest = match fsutil::read_file_best_effort(&extension_path.join(MANIFEST_FILE)) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(
                    extension = %extension_path.display(),
                    profile = %location.path.display(),
                    "failed to read the manifest.json file: {err}"
                );
                continue;
            }
        };

        // Duplicate canonical paths should not survive canonicalization;
        // if one does, the last write wins.
        unreferenced.insert(
            extension_path.clone(),
            RawExtension {
                path: extension_path,
                manifest,
            },
        );
    }

    Ok(ProfileSnapshot {
        browser: location.browser,
        uid: location.uid,
        path: location.path.clone(),
        preferences,
        secure_preferences,
        referenced: HashMap::new(),
        unreferenced,
    })
}
