//! Per-session proximity alert tracking.
//!
//! [`ProximityTracker`] owns the alert state and radius for one monitoring
//! session and layers acknowledgment and reset on top of [`evaluate`].

use super::evaluator::evaluate_distance;
use super::types::{AlertRadius, ProximityAlertState};
use crate::geo::{distance_meters, Coordinate};

/// Result of feeding one position pair into the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertTransition {
    /// State before this observation.
    pub from: ProximityAlertState,
    /// State after this observation.
    pub to: ProximityAlertState,
    /// Rider-to-bus distance used for the decision.
    pub distance_m: f64,
}

impl AlertTransition {
    /// True if the state changed.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }

    /// True if this observation raised the alert.
    pub fn fired(&self) -> bool {
        self.from == ProximityAlertState::Armed && self.to == ProximityAlertState::Triggered
    }
}

/// Owns the proximity alert state of a single monitoring session.
#[derive(Debug, Clone)]
pub struct ProximityTracker {
    state: ProximityAlertState,
    radius: AlertRadius,
}

impl ProximityTracker {
    /// Starts an armed session with the given radius.
    pub fn new(radius: AlertRadius) -> Self {
        Self {
            state: ProximityAlertState::Armed,
            radius,
        }
    }

    /// Current alert state.
    pub fn state(&self) -> ProximityAlertState {
        self.state
    }

    /// Radius for this session.
    pub fn radius(&self) -> AlertRadius {
        self.radius
    }

    /// Evaluates one rider/bus position pair.
    pub fn observe(&mut self, rider: Coordinate, bus: Coordinate) -> AlertTransition {
        let distance_m = distance_meters(rider, bus);
        let from = self.state;
        let to = evaluate_distance(from, distance_m, self.radius.meters_f64());
        self.state = to;

        let transition = AlertTransition { from, to, distance_m };
        if transition.fired() {
            tracing::info!(
                distance_m = format!("{:.0}", distance_m),
                radius = %self.radius,
                "Proximity alert triggered"
            );
        } else if transition.changed() {
            tracing::debug!(from = %from, to = %to, "Proximity alert state changed");
        }
        transition
    }

    /// Acknowledges a raised alert, moving Triggered to Suppressed.
    ///
    /// Returns false if there was no raised alert to acknowledge.
    pub fn acknowledge(&mut self) -> bool {
        if self.state == ProximityAlertState::Triggered {
            self.state = ProximityAlertState::Suppressed;
            true
        } else {
            false
        }
    }

    /// Re-arms the session, optionally with a new radius.
    pub fn reset(&mut self, radius: AlertRadius) {
        self.state = ProximityAlertState::Armed;
        self.radius = radius;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProximityAlertState::*;

    const RIDER: Coordinate = Coordinate::new(14.6, 120.98);

    #[test]
    fn test_fires_once_then_holds() {
        let mut tracker = ProximityTracker::new(AlertRadius::OneKm);

        let t = tracker.observe(RIDER, RIDER.offset_meters(1500.0, 0.0));
        assert!(!t.changed());

        let t = tracker.observe(RIDER, RIDER.offset_meters(900.0, 0.0));
        assert!(t.fired());
        assert_eq!(tracker.state(), Triggered);

        let t = tracker.observe(RIDER, RIDER.offset_meters(500.0, 0.0));
        assert!(!t.fired());
        assert_eq!(tracker.state(), Triggered);
    }

    #[test]
    fn test_acknowledge_then_hysteresis() {
        let mut tracker = ProximityTracker::new(AlertRadius::OneKm);
        tracker.observe(RIDER, RIDER.offset_meters(900.0, 0.0));
        assert!(tracker.acknowledge());
        assert_eq!(tracker.state(), Suppressed);

        // Lingering inside the zone does not re-trigger
        tracker.observe(RIDER, RIDER.offset_meters(950.0, 0.0));
        assert_eq!(tracker.state(), Suppressed);

        // Leaving re-arms, re-entering fires again
        tracker.observe(RIDER, RIDER.offset_meters(1100.0, 0.0));
        assert_eq!(tracker.state(), Armed);
        assert!(tracker.observe(RIDER, RIDER.offset_meters(800.0, 0.0)).fired());
    }

    #[test]
    fn test_acknowledge_without_alert_is_noop() {
        let mut tracker = ProximityTracker::new(AlertRadius::ThreeKm);
        assert!(!tracker.acknowledge());
        assert_eq!(tracker.state(), Armed);
    }

    #[test]
    fn test_reset_changes_radius_and_rearms() {
        let mut tracker = ProximityTracker::new(AlertRadius::OneKm);
        tracker.observe(RIDER, RIDER);
        assert_eq!(tracker.state(), Triggered);

        tracker.reset(AlertRadius::FiveKm);
        assert_eq!(tracker.state(), Armed);
        assert_eq!(tracker.radius(), AlertRadius::FiveKm);
        assert!(tracker.observe(RIDER, RIDER.offset_meters(4000.0, 0.0)).fired());
    }
}
