//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::feed::FeedError;
use crate::geo::CoordError;
use crate::logging::LoggingError;
use crate::pairing::{CommitError, LookupError, PairingError, PayloadError};
use crate::proximity::InvalidRadius;
use crate::routing::RoutingError;
use crate::storage::StorageError;

/// Any error produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Coordinate(#[from] CoordError),

    #[error(transparent)]
    Radius(#[from] InvalidRadius),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Pairing(#[from] PairingError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),
}

pub type Result<T> = std::result::Result<T, Error>;
