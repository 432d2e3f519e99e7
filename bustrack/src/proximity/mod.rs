//! Proximity alerting
//!
//! Evaluates the rider's distance to a moving bus and raises an alert when a
//! configured radius is crossed.
//!
//! # State Machine
//!
//! ```text
//! Armed --[distance <= radius]--> Triggered
//! Triggered --[acknowledge]--> Suppressed
//! Suppressed --[distance > radius]--> Armed
//! any --[reset]--> Armed
//! ```
//!
//! Suppressed requires the bus to leave the zone before the alert can fire
//! again, so a bus lingering at the boundary raises a single alert.

mod evaluator;
mod tracker;
mod types;

pub use evaluator::{evaluate, evaluate_distance};
pub use tracker::{AlertTransition, ProximityTracker};
pub use types::{AlertRadius, InvalidRadius, ProximityAlertState};
