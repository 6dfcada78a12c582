//! Failure outcomes for the scan pipeline.
//!
//! Failures never cross component boundaries as panics; each stage returns
//! an explicit error and the caller decides per item whether to skip and
//! continue (the dominant policy) or drop the containing profile.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// Both preferences documents are missing or unreadable. Fatal to the
    /// profile.
    #[error("no readable preferences document in profile {}", path.display())]
    PreferencesUnreadable { path: PathBuf },

    /// A non-empty preferences document failed to parse. Fatal to the
    /// profile, since reconciliation needs the document tree.
    #[error("failed to parse the {document} file of profile {}: {source}", path.display())]
    PreferencesParse {
        document: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An extension's manifest failed to parse. Fatal to the extension.
    #[error("failed to parse the manifest.json file of extension {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The locale message document could not be loaded or parsed. Soft:
    /// properties keep their unresolved placeholder values.
    #[error("failed to load localization data for locale {locale} in extension {}", path.display())]
    LocalizationUnavailable { locale: String, path: PathBuf },

    /// No settings entry in the preferences document matches the extension
    /// path. Soft: the extension is emitted with empty settings.
    #[error("no preferences settings entry matches extension {}", path.display())]
    SettingsEntryMissing { path: PathBuf },

    /// `profile.name` is absent from both documents for a browser that
    /// requires it. Fatal to the profile.
    #[error("failed to acquire the name of profile {}", path.display())]
    ProfileNameMissing { path: PathBuf },
}
