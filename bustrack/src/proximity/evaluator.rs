//! Stateless proximity evaluation.
//!
//! Called once per incoming bus snapshot. The result depends only on the
//! inputs, so replaying a sequence of positions always yields the same
//! sequence of states.

use super::types::ProximityAlertState;
use crate::geo::{distance_meters, Coordinate};

/// Advances the alert state for one rider/bus position pair.
pub fn evaluate(
    current: ProximityAlertState,
    rider: Coordinate,
    bus: Coordinate,
    radius_meters: f64,
) -> ProximityAlertState {
    evaluate_distance(current, distance_meters(rider, bus), radius_meters)
}

/// Advances the alert state for an already computed distance.
///
/// Triggered is never left here; only an explicit acknowledgment moves it
/// to Suppressed. Suppressed re-arms once the bus is outside the radius.
pub fn evaluate_distance(
    current: ProximityAlertState,
    distance_m: f64,
    radius_meters: f64,
) -> ProximityAlertState {
    match current {
        ProximityAlertState::Armed if distance_m <= radius_meters => ProximityAlertState::Triggered,
        ProximityAlertState::Suppressed if distance_m > radius_meters => ProximityAlertState::Armed,
        state => state,
    }
}
