//! BusTrack - real-time bus proximity, ETA and conductor pairing
//!
//! The engine behind the rider and driver apps:
//!
//! - **Proximity alerts**: fire once when a tracked bus enters the rider's
//!   chosen radius, stay quiet after acknowledgement until the bus leaves
//! - **ETA**: road distance from a routing oracle divided by the bus's
//!   reported speed, with "not moving" and "not available" outcomes
//! - **Pairing**: a conductor's QR code is scanned, verified and written to
//!   the bus record
//!
//! # Architecture
//!
//! ```text
//!  LocationFeed ──► BusMonitor ──► MonitorView (watch)
//!                     │    │
//!                     │    └──► eta ──► RoutingOracle (HTTP)
//!                     └──► proximity
//!
//!  ScanEvent ──► PairingController ──► ConductorLookup
//!                  (state machine)  └─► BusRecordStore
//! ```
//!
//! External systems (document store, routing API, camera, device storage)
//! are reached only through traits so hosts can plug in real clients.

pub mod config;
pub mod error;
pub mod eta;
pub mod feed;
pub mod geo;
pub mod logging;
pub mod monitor;
pub mod pairing;
pub mod proximity;
pub mod routing;
pub mod scan;
pub mod storage;

pub use error::{Error, Result};
