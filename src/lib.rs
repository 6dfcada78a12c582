pub mod config;
pub mod error;
pub mod fsutil;
pub mod model;
pub mod output;
pub mod platform;
pub mod scan;
pub mod users;

pub use config::Config;
pub use error::ScanError;
pub use model::{BrowserType, CanonicalPath, Extension, Profile, ScanReport};
pub use scan::scan_profiles;
