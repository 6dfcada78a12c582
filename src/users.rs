//! User account enumeration.
//!
//! The scan engine consumes caller-supplied `(uid, home directory)` pairs;
//! this module produces them. By default only the invoking user is
//! scanned; on unix, `all_users` walks `/etc/passwd` so every local
//! account's browser profiles are covered.

use std::path::PathBuf;

use crate::model::UserInfo;

/// Returns the invoking user, if a home directory can be determined.
pub fn current_user() -> Option<UserInfo> {
    let home = dirs::home_dir()?;
    let uid = home_owner_uid(&home);
    Some(UserInfo { uid, home })
}

#[cfg(unix)]
fn home_owner_uid(home: &std::path::Path) -> i64 {
    use std::os::unix::fs::MetadataExt;

    std::fs::metadata(home)
        .map(|meta| i64::from(meta.uid()))
        .unwrap_or(0)
}

#[cfg(not(unix))]
fn home_owner_uid(_home: &std::path::Path) -> i64 {
    0
}

/// Returns every local user account with an existing home directory.
///
/// Falls back to the invoking user on platforms without `/etc/passwd`.
pub fn all_users() -> Vec<UserInfo> {
    #[cfg(unix)]
    {
        if let Ok(passwd) = std::fs::read_to_string("/etc/passwd") {
            let users: Vec<UserInfo> = parse_passwd(&passwd)
                .into_iter()
                .filter(|user| user.home.is_dir())
                .collect();

            if !users.is_empty() {
                return users;
            }
        }
    }

    current_user().into_iter().collect()
}

/// Parses passwd-format lines into `(uid, home)` pairs.
///
/// Malformed lines and entries without a home field are skipped.
fn parse_passwd(content: &str) -> Vec<UserInfo> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() < 6 {
                return None;
            }

            let uid: i64 = fields[2].parse().ok()?;
            let home = fields[5];
            if home.is_empty() {
                return None;
            }

            Some(UserInfo {
                uid,
                home: PathBuf::from(home),
            })
        })
        .collect()
}
