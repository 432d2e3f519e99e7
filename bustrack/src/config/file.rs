//! Config file model, load and save.

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::debug;

use super::keys::ConfigKey;
use super::ConfigError;
use crate::eta::EtaConfig;
use crate::logging::LoggingConfig;
use crate::proximity::AlertRadius;
use crate::routing::{DEFAULT_DIRECTIONS_URL, DEFAULT_TIMEOUT_SECS};
use crate::scan::ScanViewport;

/// Default side of the scan window relative to the shorter display edge.
pub const DEFAULT_VIEWPORT_FRACTION: f64 = 0.7;

const CONFIG_DIR_NAME: &str = ".bustrack";
const CONFIG_FILE_NAME: &str = "config.ini";

/// `~/.bustrack`, or `./.bustrack` when no home directory is known.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// `~/.bustrack/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// `[routing]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DIRECTIONS_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[alerts]` section.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlertSettings {
    pub radius: AlertRadius,
    pub straight_line_fallback: bool,
}

impl AlertSettings {
    pub fn eta_config(&self) -> EtaConfig {
        EtaConfig {
            straight_line_fallback: self.straight_line_fallback,
        }
    }
}

/// `[scanner]` section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannerSettings {
    pub viewport_fraction: f64,
}

impl ScannerSettings {
    /// Scan window for a display of the given size.
    pub fn viewport_for(&self, display_width: f64, display_height: f64) -> ScanViewport {
        ScanViewport::centered(display_width, display_height, self.viewport_fraction)
    }
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            viewport_fraction: DEFAULT_VIEWPORT_FRACTION,
        }
    }
}

/// All settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub routing: RoutingSettings,
    pub alerts: AlertSettings,
    pub scanner: ScannerSettings,
    pub logging: LoggingConfig,
}

impl ConfigFile {
    /// Loads from [`config_file_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads from `path`; a missing file gives defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Builds settings from parsed INI.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Serialises settings to INI. Unset optional values are omitted.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section())).set(key.key_name(), value);
            }
        }
        ini
    }

    /// Saves to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Saves to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.routing.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.alerts.radius, AlertRadius::OneKm);
    }

    #[test]
    fn test_load_parses_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(
            &path,
            "[routing]\napi_key = secret\ntimeout_secs = 4\n\n\
             [alerts]\nradius_m = 3000\nstraight_line_fallback = true\n\n\
             [scanner]\nviewport_fraction = 0.5\n\n\
             [logging]\nlevel = debug\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.routing.api_key.as_deref(), Some("secret"));
        assert_eq!(config.routing.timeout_secs, 4);
        assert_eq!(config.routing.base_url, DEFAULT_DIRECTIONS_URL);
        assert_eq!(config.alerts.radius, AlertRadius::ThreeKm);
        assert!(config.alerts.eta_config().straight_line_fallback);
        assert_eq!(config.scanner.viewport_fraction, 0.5);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[alerts]\ncolour = red\n[extra]\nx = 1\n").unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[alerts]\nradius_m = 2500\n").unwrap();

        assert!(matches!(
            ConfigFile::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.routing.api_key = Some("k".to_string());
        config.alerts.radius = AlertRadius::FiveKm;
        config.logging.directory = Some(dir.path().join("logs"));
        config.save_to(&path).unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_viewport_for_display() {
        let settings = ScannerSettings::default();
        let viewport = settings.viewport_for(1000.0, 2000.0);
        assert!((viewport.width - 700.0).abs() < 1e-9);
        assert!((viewport.origin_x - 150.0).abs() < 1e-9);
    }
}
