//! Rider monitoring session
//!
//! Ties the location feed, the proximity tracker and the ETA engine together
//! for one rider watching one bus, and publishes a [`MonitorView`] for the UI.
//!
//! # Data Flow
//!
//! ```text
//! LocationFeed ──► SnapshotLedger ──► ProximityTracker ──┐
//!                        │                               ├──► watch<MonitorView>
//!                        └──────────► ETA engine ────────┘
//! ```
//!
//! Closing the session cancels the pending ETA request, unsubscribes from the
//! feed and refuses further snapshots.

mod session;
mod view;

pub use session::BusMonitor;
pub use view::{MonitorConfig, MonitorView, SnapshotOutcome};
