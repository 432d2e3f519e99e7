//! Dotted `section.key` access to config values.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFile;
use super::ConfigError;
use crate::proximity::AlertRadius;

/// A settable configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    RoutingBaseUrl,
    RoutingApiKey,
    RoutingTimeoutSecs,
    AlertsRadiusM,
    AlertsStraightLineFallback,
    ScannerViewportFraction,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            Self::RoutingBaseUrl,
            Self::RoutingApiKey,
            Self::RoutingTimeoutSecs,
            Self::AlertsRadiusM,
            Self::AlertsStraightLineFallback,
            Self::ScannerViewportFraction,
            Self::LoggingLevel,
            Self::LoggingDirectory,
        ]
    }

    /// Dotted name, e.g. `alerts.radius_m`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoutingBaseUrl => "routing.base_url",
            Self::RoutingApiKey => "routing.api_key",
            Self::RoutingTimeoutSecs => "routing.timeout_secs",
            Self::AlertsRadiusM => "alerts.radius_m",
            Self::AlertsStraightLineFallback => "alerts.straight_line_fallback",
            Self::ScannerViewportFraction => "scanner.viewport_fraction",
            Self::LoggingLevel => "logging.level",
            Self::LoggingDirectory => "logging.directory",
        }
    }

    pub fn section(&self) -> &'static str {
        self.name().split_once('.').map_or("", |(section, _)| section)
    }

    pub fn key_name(&self) -> &'static str {
        self.name().split_once('.').map_or("", |(_, key)| key)
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::RoutingBaseUrl => config.routing.base_url.clone(),
            Self::RoutingApiKey => config.routing.api_key.clone().unwrap_or_default(),
            Self::RoutingTimeoutSecs => config.routing.timeout_secs.to_string(),
            Self::AlertsRadiusM => config.alerts.radius.meters().to_string(),
            Self::AlertsStraightLineFallback => config.alerts.straight_line_fallback.to_string(),
            Self::ScannerViewportFraction => config.scanner.viewport_fraction.to_string(),
            Self::LoggingLevel => config.logging.level.clone(),
            Self::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parses and stores `value`. An empty value clears optional keys.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            Self::RoutingBaseUrl => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(self.invalid(value, "expected an http(s) URL"));
                }
                config.routing.base_url = value.to_string();
            }
            Self::RoutingApiKey => {
                config.routing.api_key = (!value.is_empty()).then(|| value.to_string());
            }
            Self::RoutingTimeoutSecs => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| self.invalid(value, "expected whole seconds"))?;
                if secs == 0 {
                    return Err(self.invalid(value, "must be at least 1"));
                }
                config.routing.timeout_secs = secs;
            }
            Self::AlertsRadiusM => {
                config.alerts.radius = value
                    .parse::<AlertRadius>()
                    .map_err(|e| self.invalid(value, &e.to_string()))?;
            }
            Self::AlertsStraightLineFallback => {
                config.alerts.straight_line_fallback = parse_bool(value)
                    .ok_or_else(|| self.invalid(value, "expected true or false"))?;
            }
            Self::ScannerViewportFraction => {
                let fraction: f64 = value
                    .parse()
                    .map_err(|_| self.invalid(value, "expected a number"))?;
                if !(fraction > 0.0 && fraction <= 1.0) {
                    return Err(self.invalid(value, "must be in (0, 1]"));
                }
                config.scanner.viewport_fraction = fraction;
            }
            Self::LoggingLevel => {
                if value.is_empty() {
                    return Err(self.invalid(value, "level cannot be empty"));
                }
                config.logging.level = value.to_string();
            }
            Self::LoggingDirectory => {
                config.logging.directory = (!value.is_empty()).then(|| PathBuf::from(value));
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name().to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == s.trim())
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
