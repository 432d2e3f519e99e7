//! CLI error type.

use std::fmt;
use std::io;
use std::path::PathBuf;

use bustrack::config::ConfigError;
use bustrack::feed::FeedError;
use bustrack::pairing::PairingError;
use bustrack::storage::StorageError;

/// Errors reported to the user before exiting non-zero.
#[derive(Debug)]
pub enum CliError {
    /// Bad or missing configuration.
    Config(String),
    /// An input file could not be read.
    Read { path: PathBuf, source: io::Error },
    /// A line of an input file could not be decoded.
    Input {
        path: PathBuf,
        line: usize,
        message: String,
    },
    /// The runtime could not be started.
    Runtime(io::Error),
    /// Error from the engine.
    Engine(bustrack::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Read { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            CliError::Input {
                path,
                line,
                message,
            } => write!(f, "{}:{}: {}", path.display(), line, message),
            CliError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
            CliError::Engine(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Read { source, .. } => Some(source),
            CliError::Runtime(e) => Some(e),
            CliError::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<bustrack::Error> for CliError {
    fn from(e: bustrack::Error) -> Self {
        CliError::Engine(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Engine(e.into())
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        CliError::Engine(e.into())
    }
}

impl From<PairingError> for CliError {
    fn from(e: PairingError) -> Self {
        CliError::Engine(e.into())
    }
}

impl From<FeedError> for CliError {
    fn from(e: FeedError) -> Self {
        CliError::Engine(e.into())
    }
}
