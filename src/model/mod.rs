//! Core data types for browsers, profiles, and extensions.
//!
//! This module contains the fundamental types used throughout
//! chromeprofiles:
//!
//! - [`BrowserType`] - A supported Chromium-family browser
//! - [`CanonicalPath`] - Path identity in its resolved, symlink-free form
//! - [`ProfileLocation`] / [`ProfileSnapshot`] - Intermediate pipeline state
//! - [`Extension`] / [`Profile`] - Resolved output entities
//! - [`ScanReport`] - Complete scan results
//!
//! All entities are created fresh per scan invocation and discarded once
//! output has been produced; nothing is persisted between calls.

mod browser;
mod profile;

pub use browser::*;
pub use profile::*;
