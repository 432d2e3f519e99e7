//! Tracing subscriber setup.
//!
//! Logs go to stderr and, when a directory is configured, to
//! `<directory>/bustrack.log` through a non-blocking writer. `RUST_LOG`
//! overrides the configured level.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "bustrack.log";

const DEFAULT_LEVEL: &str = "info";

/// Logging failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("Failed to create log directory: {0}")]
    Directory(#[from] io::Error),

    /// A global subscriber is already installed.
    #[error("Logging already initialised: {0}")]
    AlreadyInitialized(String),
}

/// `[logging]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level (`info`) or full filter directive (`bustrack=debug,reqwest=warn`).
    pub level: String,
    /// Directory for the log file; stderr only when `None`.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            directory: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Filter directive for [`EnvFilter`].
    ///
    /// A bare level applies to this workspace's crates; dependencies stay at
    /// `warn`.
    pub fn filter_directive(&self) -> String {
        let level = self.level.trim();
        if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("warn,bustrack={0},bustrack_cli={0}", level)
        }
    }
}

/// Keeps the file writer alive; dropping it flushes pending lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _worker: Option<WorkerGuard>,
}

/// Installs the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(LocalTime::new(Rfc3339));

    let (file_layer, worker) = match &config.directory {
        Some(directory) => {
            fs::create_dir_all(directory)?;
            let appender = tracing_appender::rolling::never(directory, LOG_FILE_NAME);
            let (writer, worker) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::new(Rfc3339));
            (Some(layer), Some(worker))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard { _worker: worker })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_scopes_to_workspace() {
        let config = LoggingConfig::default().with_level("debug");
        assert_eq!(
            config.filter_directive(),
            "warn,bustrack=debug,bustrack_cli=debug"
        );
    }

    #[test]
    fn test_full_directive_passes_through() {
        let config = LoggingConfig::default().with_level("bustrack=trace,reqwest=info");
        assert_eq!(config.filter_directive(), "bustrack=trace,reqwest=info");
    }

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.directory.is_none());
        assert!(LoggingConfig::default()
            .with_directory("/tmp/logs")
            .directory
            .is_some());
    }
}
