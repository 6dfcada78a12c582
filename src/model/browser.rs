use serde::{Deserialize, Serialize};

/// A Chromium-family browser whose profiles can be inventoried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrowserType {
    #[serde(rename = "chrome")]
    GoogleChrome,
    #[serde(rename = "brave")]
    Brave,
    #[serde(rename = "chromium")]
    Chromium,
    #[serde(rename = "yandex")]
    Yandex,
    #[serde(rename = "edge")]
    Edge,
    #[serde(rename = "edge_beta")]
    EdgeBeta,
    #[serde(rename = "opera")]
    Opera,
}

impl BrowserType {
    /// All supported browser types, in display order.
    pub const ALL: &'static [BrowserType] = &[
        BrowserType::GoogleChrome,
        BrowserType::Brave,
        BrowserType::Chromium,
        BrowserType::Yandex,
        BrowserType::Edge,
        BrowserType::EdgeBeta,
        BrowserType::Opera,
    ];

    /// Returns the stable name used in output rows and CLI filters.
    ///
    /// Names are one-to-one: `Edge` and `EdgeBeta` map to distinct strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserType::GoogleChrome => "chrome",
            BrowserType::Brave => "brave",
            BrowserType::Chromium => "chromium",
            BrowserType::Yandex => "yandex",
            BrowserType::Edge => "edge",
            BrowserType::EdgeBeta => "edge_beta",
            BrowserType::Opera => "opera",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BrowserType::GoogleChrome => "Google Chrome",
            BrowserType::Brave => "Brave",
            BrowserType::Chromium => "Chromium",
            BrowserType::Yandex => "Yandex Browser",
            BrowserType::Edge => "Microsoft Edge",
            BrowserType::EdgeBeta => "Microsoft Edge Beta",
            BrowserType::Opera => "Opera",
        }
    }
}

impl std::fmt::Display for BrowserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BrowserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" | "google-chrome" => Ok(BrowserType::GoogleChrome),
            "brave" => Ok(BrowserType::Brave),
            "chromium" => Ok(BrowserType::Chromium),
            "yandex" => Ok(BrowserType::Yandex),
            "edge" => Ok(BrowserType::Edge),
            "edge_beta" | "edge-beta" => Ok(BrowserType::EdgeBeta),
            "opera" => Ok(BrowserType::Opera),
            _ => Err(format!(
                "Unknown browser: {}. Use: chrome, brave, chromium, yandex, edge, edge_beta, opera",
                s
            )),
        }
    }
}
