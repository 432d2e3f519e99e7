//! INI configuration file.
//!
//! Settings live in `~/.bustrack/config.ini`:
//!
//! ```ini
//! [routing]
//! base_url = https://maps.googleapis.com/maps/api/directions/json
//! api_key = ...
//! timeout_secs = 10
//!
//! [alerts]
//! radius_m = 1000
//! straight_line_fallback = false
//!
//! [scanner]
//! viewport_fraction = 0.7
//!
//! [logging]
//! level = info
//! directory = /var/log/bustrack
//! ```
//!
//! A missing file yields defaults. Unknown keys are ignored; known keys with
//! malformed values are errors.

mod file;
mod keys;

pub use file::{
    config_directory, config_file_path, AlertSettings, ConfigFile, RoutingSettings,
    ScannerSettings, DEFAULT_VIEWPORT_FRACTION,
};
pub use keys::ConfigKey;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("Config I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid INI.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A known key holds an unusable value.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The key is not one of [`ConfigKey::all`].
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}
