//! Profile discovery.
//!
//! Combines user home directories with the platform's profile root
//! suffixes and validates each candidate by the presence of a preferences
//! document. Browsers that keep several profiles under one root (e.g.
//! `Default`, `Profile 1`) are handled by testing the root's immediate
//! subdirectories, exactly one level deep.

use std::path::Path;

use crate::fsutil;
use crate::model::{CanonicalPath, ProfileLocation, UserInfo};
use crate::platform::{profile_root_suffixes, PathSuffix, Platform};

/// The preferences file included in each profile.
pub const PREFERENCES_FILE: &str = "Preferences";

/// The alternative `Secure Preferences` file included in each profile.
pub const SECURE_PREFERENCES_FILE: &str = "Secure Preferences";

/// Returns true if `path` contains either the `Preferences` or the
/// `Secure Preferences` file.
pub fn is_valid_profile(path: &Path) -> bool {
    [PREFERENCES_FILE, SECURE_PREFERENCES_FILE]
        .iter()
        .any(|name| fsutil::is_readable_file(&path.join(name)))
}

/// Locates every valid profile belonging to `users` on the current
/// platform.
pub fn locate_profiles(users: &[UserInfo]) -> Vec<ProfileLocation> {
    locate_profiles_in(users, profile_root_suffixes(Platform::current()))
}

/// Locates profiles using an explicit suffix table.
///
/// A user with no valid profiles contributes no entries; a missing root
/// directory is silently skipped.
pub fn locate_profiles_in(users: &[UserInfo], suffixes: &[PathSuffix]) -> Vec<ProfileLocation> {
    let mut output = Vec::new();

    for user in users {
        for (browser, suffix) in suffixes {
            let root = CanonicalPath::resolve(user.home.join(suffix));

            // The root itself may be a single-profile directory.
            if is_valid_profile(root.as_path()) {
                output.push(ProfileLocation {
                    browser: *browser,
                    uid: user.uid,
                    path: root,
                });
                continue;
            }

            // Otherwise look one level down for multi-profile layouts.
            let Ok(subdirs) = fsutil::list_directories(root.as_path()) else {
                continue;
            };

            for subdir in subdirs {
                let subdir = CanonicalPath::resolve(subdir);
                if is_valid_profile(subdir.as_path()) {
                    output.push(ProfileLocation {
                        browser: *browser,
                        uid: user.uid,
                        path: subdir,
                    });
                }
            }
        }
    }

    output
}
