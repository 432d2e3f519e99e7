//! Location/status stream
//!
//! Bus positions arrive as pushed [`LocationRecord`]s. They are validated into
//! [`BusSnapshot`]s, ordered per bus by report timestamp in a
//! [`SnapshotLedger`], and delivered through the [`LocationFeed`]
//! subscription interface.
//!
//! # Example
//!
//! ```ignore
//! use bustrack::feed::{subscribe_channel, InProcessFeed, FeedEvent};
//!
//! let feed = InProcessFeed::new();
//! let (subscription, mut events) = subscribe_channel(&feed);
//!
//! feed.publish(snapshot);
//! if let Some(FeedEvent::Update(snapshot)) = events.recv().await {
//!     // apply snapshot
//! }
//!
//! // Dropping the handle unsubscribes
//! drop(subscription);
//! ```

mod record;
mod snapshot;
mod subscription;

pub use record::{LocationRecord, RecordPosition};
pub use snapshot::{BusSnapshot, LedgerOutcome, SnapshotLedger};
pub use subscription::{
    subscribe_channel, ErrorCallback, FeedEvent, InProcessFeed, LocationFeed, Subscription,
    UpdateCallback,
};

use thiserror::Error;

use crate::geo::CoordError;

/// Errors raised by the location stream or while validating its records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// The record's position is out of range.
    #[error("Invalid position: {0}")]
    InvalidPosition(#[from] CoordError),

    /// The record's speed is negative or not a number.
    #[error("Invalid speed: {0} km/h")]
    InvalidSpeed(f64),

    /// The record's timestamp cannot be represented.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    /// The subscription lost its connection to the store.
    #[error("Feed disconnected: {0}")]
    Disconnected(String),
}
