//! Configuration file handling.
//!
//! This module provides loading and saving of chromeprofiles configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/chromeprofiles/config.toml`
//! - macOS: `~/Library/Application Support/chromeprofiles/config.toml`
//! - Windows: `%APPDATA%\chromeprofiles\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! default_format = "table"
//! browsers = ["chrome", "brave"]
//! include_unreferenced = true
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::model::BrowserType;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Browsers to scan when no `--browser` flag is provided.
    ///
    /// An empty list means all supported browsers.
    pub browsers: Vec<BrowserType>,

    /// Whether extensions found on disk but not referenced by any
    /// preferences document are reported.
    ///
    /// Default: true
    pub include_unreferenced: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: "table".to_string(),
            browsers: Vec::new(),
            include_unreferenced: true,
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file, creating the parent
    /// directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chromeprofiles")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
