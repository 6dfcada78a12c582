//! Platform-specific profile root locations.
//!
//! Each supported browser keeps its profiles under a fixed suffix of the
//! owning user's home directory. The tables here are static lookups; a
//! browser with no suffix for the current platform is simply absent from
//! iteration.

use crate::model::BrowserType;

/// Operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOS,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "linux")]
        return Platform::Linux;
        #[cfg(target_os = "macos")]
        return Platform::MacOS;
        #[cfg(target_os = "windows")]
        return Platform::Windows;
    }
}

/// A (browser, home-relative profile root) pair.
pub type PathSuffix = (BrowserType, &'static str);

#[rustfmt::skip]
const WINDOWS_SUFFIXES: &[PathSuffix] = &[
    (BrowserType::GoogleChrome, r"AppData\Local\Google\Chrome\User Data"),
    (BrowserType::Brave, r"AppData\Roaming\brave"),
    (BrowserType::Chromium, r"AppData\Local\Chromium"),
    (BrowserType::Yandex, r"AppData\Local\Yandex\YandexBrowser\User Data"),
    (BrowserType::Edge, r"AppData\Local\Microsoft\Edge\User Data"),
    (BrowserType::EdgeBeta, r"AppData\Local\Microsoft\Edge Beta\User Data"),
    (BrowserType::Opera, r"AppData\Roaming\Opera Software\Opera Stable"),
];

#[rustfmt::skip]
const MACOS_SUFFIXES: &[PathSuffix] = &[
    (BrowserType::GoogleChrome, "Library/Application Support/Google/Chrome"),
    (BrowserType::Brave, "Library/Application Support/BraveSoftware/Brave-Browser"),
    (BrowserType::Chromium, "Library/Application Support/Chromium"),
    (BrowserType::Yandex, "Library/Application Support/Yandex/YandexBrowser"),
    (BrowserType::Opera, "Library/Application Support/com.operasoftware.Opera"),
];

#[rustfmt::skip]
const LINUX_SUFFIXES: &[PathSuffix] = &[
    (BrowserType::GoogleChrome, ".config/google-chrome"),
    (BrowserType::Brave, ".config/BraveSoftware/Brave-Browser"),
    (BrowserType::Chromium, ".config/chromium"),
    (BrowserType::Chromium, "snap/chromium/common/chromium"),
    (BrowserType::Yandex, ".config/yandex-browser-beta"),
    (BrowserType::Opera, ".config/opera"),
];

/// Returns the profile root suffixes for `platform`.
pub fn profile_root_suffixes(platform: Platform) -> &'static [PathSuffix] {
    match platform {
        Platform::Windows => WINDOWS_SUFFIXES,
        Platform::MacOS => MACOS_SUFFIXES,
        Platform::Linux => LINUX_SUFFIXES,
    }
}
