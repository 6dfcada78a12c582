//! The profile and extension scan pipeline.
//!
//! Stages, in order:
//!
//! 1. [`locator`] - find candidate profile directories under user homes
//! 2. [`snapshot`] - capture raw preferences and extension folders
//! 3. [`reconcile`] - partition extensions into referenced/unreferenced
//! 4. [`manifest`] - resolve properties, localization, and digests
//! 5. [`assemble`] - join profile settings and produce final profiles
//!
//! The pipeline is fully synchronous and read-only. Failures are scoped
//! to the smallest affected unit: a broken extension never drops its
//! profile, and a broken profile never aborts the scan.
//!
//! # Example
//!
//! ```no_run
//! use chromeprofiles::scan::scan_profiles;
//! use chromeprofiles::users;
//!
//! let users: Vec<_> = users::current_user().into_iter().collect();
//! for profile in scan_profiles(&users, None) {
//!     println!("{} {}: {} extensions", profile.browser, profile.name, profile.extensions.len());
//! }
//! ```

pub mod assemble;
pub mod locator;
pub mod manifest;
pub mod reconcile;
pub mod snapshot;

use tracing::error;

use crate::model::{BrowserType, Profile, ProfileLocation, UserInfo};
use reconcile::PathCache;

/// Scans every profile belonging to `users` on the current platform,
/// optionally restricted to a set of browsers.
pub fn scan_profiles(users: &[UserInfo], browsers: Option<&[BrowserType]>) -> Vec<Profile> {
    let mut locations = locator::locate_profiles(users);
    if let Some(filter) = browsers {
        locations.retain(|location| filter.contains(&location.browser));
    }

    scan_located(&locations)
}

/// Runs the capture/reconcile/assemble stages over pre-located profiles.
///
/// One canonicalization cache spans the whole invocation and is discarded
/// with it.
pub fn scan_located(locations: &[ProfileLocation]) -> Vec<Profile> {
    let mut cache = PathCache::new();
    let mut profiles = Vec::new();

    for location in locations {
        let snapshot = match snapshot::capture(location) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!("dropping profile: {err}");
                continue;
            }
        };

        let reconciled = match reconcile::reconcile(snapshot, &mut cache) {
            Ok(reconciled) => reconciled,
            Err(err) => {
                error!("dropping profile: {err}");
                continue;
            }
        };

        match assemble::assemble(reconciled, &mut cache) {
            Ok(profile) => profiles.push(profile),
            Err(err) => error!("dropping profile: {err}"),
        }
    }

    profiles
}
