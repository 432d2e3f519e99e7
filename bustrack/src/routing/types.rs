//! Core types for the routing oracle adapter.

use thiserror::Error;

/// Errors returned by the routing oracle or its transport.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// Transport-level failure (connection, timeout, non-2xx HTTP status).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The oracle answered with a status other than `OK`.
    #[error("Routing oracle returned status {0}")]
    Status(String),

    /// The oracle answered `OK` but without a usable route.
    #[error("No route between origin and destination")]
    NoRoute,

    /// The response body could not be decoded.
    #[error("Invalid routing response: {0}")]
    InvalidResponse(String),
}

/// Why an ETA in minutes could not be produced.
///
/// `NotMoving` is a distinguished result so callers can render
/// "Bus is not moving" separately from a plain "unavailable".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EtaUnavailable {
    /// The bus reported zero speed; no oracle request was made.
    #[error("Bus is not moving")]
    NotMoving,

    /// The oracle request failed.
    #[error("ETA unavailable: {0}")]
    Unavailable(#[from] RoutingError),
}
