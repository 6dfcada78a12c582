//! Read-only filesystem access for the scan pipeline.
//!
//! All access is best-effort: listings and reads report their errors to the
//! caller, which decides per item whether to skip or drop a container.
//! Nothing here retries, writes, or locks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Lists the immediate subdirectories of `path`, sorted by name.
///
/// Non-directory entries are skipped. Sorting keeps repeated scans of an
/// unchanged tree byte-for-byte identical.
///
/// # Errors
///
/// Returns an error if `path` cannot be listed at all.
pub fn list_directories(path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(path)?
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.path())
        .collect();

    dirs.sort();
    Ok(dirs)
}

/// Reads a file's contents, tolerating files opened by other processes
/// where the platform allows a shared read.
///
/// `std::fs` opens with shared read access on every supported platform, so
/// a preferences document held open by a running browser can still be read.
pub fn read_file_best_effort(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Returns true if `path` names a readable file.
pub fn is_readable_file(path: &Path) -> bool {
    fs::File::open(path)
        .and_then(|f| f.metadata())
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_directories_skips_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("file.txt"), b"x").unwrap();

        let listed = list_directories(dir.path()).unwrap();
        assert_eq!(listed, vec![dir.path().join("a"), dir.path().join("b")]);
    }

    #[test]
    fn test_list_directories_missing_path() {
        assert!(list_directories(Path::new("/does/not/exist")).is_err());
    }

    #[test]
    fn test_is_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Preferences");
        assert!(!is_readable_file(&file));

        fs::write(&file, b"{}").unwrap();
        assert!(is_readable_file(&file));
        assert!(!is_readable_file(dir.path()));
    }
}
