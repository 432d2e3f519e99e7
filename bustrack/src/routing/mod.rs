//! Routing oracle adapter
//!
//! Wraps an external directions service that reports road distance between
//! two points, and turns that distance plus the bus's current speed into an
//! ETA in whole minutes.
//!
//! # Result semantics
//!
//! [`estimate_eta_minutes`] distinguishes three outcomes:
//!
//! - `Ok(minutes)` - the oracle answered
//! - `Err(EtaUnavailable::NotMoving)` - speed is zero, no request was made
//! - `Err(EtaUnavailable::Unavailable(_))` - the oracle failed
//!
//! Failures are never retried here. The next location update drives the
//! next attempt.

mod directions;
mod http;
mod types;

pub use directions::{DirectionsOracle, DEFAULT_DIRECTIONS_URL};
pub use http::{AsyncHttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use types::{EtaUnavailable, RoutingError};

#[cfg(test)]
pub use http::tests::MockHttpClient;

use crate::geo::{distance_meters, Coordinate};

/// Black-box distance-by-road oracle.
pub trait RoutingOracle {
    /// Returns the road distance in meters from `origin` to `destination`.
    async fn road_distance_meters(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<f64, RoutingError>;
}

/// Offline oracle reporting the great-circle distance as road distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineOracle;

impl RoutingOracle for StraightLineOracle {
    async fn road_distance_meters(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<f64, RoutingError> {
        Ok(distance_meters(origin, destination))
    }
}

/// Returns true if the reported speed means the bus is stationary.
///
/// Negative and non-finite speeds are treated as stationary so they can never
/// produce a negative or infinite ETA.
#[inline]
pub fn is_stationary(speed_kmh: f64) -> bool {
    !(speed_kmh.is_finite() && speed_kmh > 0.0)
}

/// Converts a distance and a speed into whole minutes.
///
/// `eta_seconds = meters / (speed_kmh * 1000 / 3600)`, rounded to the
/// nearest minute.
fn minutes_for(distance_m: f64, speed_kmh: f64) -> u32 {
    let meters_per_second = speed_kmh * 1000.0 / 3600.0;
    let eta_seconds = distance_m / meters_per_second;
    (eta_seconds / 60.0).round().clamp(0.0, u32::MAX as f64) as u32
}

/// Estimates minutes until the bus reaches the rider, using road distance.
///
/// The oracle is queried from the bus position (origin) to the rider
/// position (destination).
pub async fn estimate_eta_minutes<O: RoutingOracle>(
    oracle: &O,
    rider: Coordinate,
    bus: Coordinate,
    speed_kmh: f64,
) -> Result<u32, EtaUnavailable> {
    if is_stationary(speed_kmh) {
        return Err(EtaUnavailable::NotMoving);
    }

    match oracle.road_distance_meters(bus, rider).await {
        Ok(distance_m) => {
            let minutes = minutes_for(distance_m, speed_kmh);
            tracing::debug!(distance_m, speed_kmh, minutes, "ETA estimated from road distance");
            Ok(minutes)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Routing oracle failed, ETA unavailable");
            Err(EtaUnavailable::Unavailable(e))
        }
    }
}

/// Estimates minutes over the straight-line (haversine) distance.
///
/// Returns `None` when the bus is stationary.
pub fn straight_line_eta_minutes(
    rider: Coordinate,
    bus: Coordinate,
    speed_kmh: f64,
) -> Option<u32> {
    if is_stationary(speed_kmh) {
        return None;
    }
    Some(minutes_for(distance_meters(bus, rider), speed_kmh))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RIDER: Coordinate = Coordinate::new(14.6000, 120.9800);
    const BUS: Coordinate = Coordinate::new(14.6200, 120.9900);

    fn oracle_with_distance(meters: u32) -> DirectionsOracle<MockHttpClient> {
        let body = format!(
            r#"{{"status":"OK","routes":[{{"legs":[{{"distance":{{"value":{}}}}}]}}]}}"#,
            meters
        );
        DirectionsOracle::new(MockHttpClient::json(&body), "k")
    }

    #[tokio::test]
    async fn test_zero_speed_is_not_moving_without_request() {
        let oracle = oracle_with_distance(3000);

        let result = estimate_eta_minutes(&oracle, RIDER, BUS, 0.0).await;
        assert_eq!(result, Err(EtaUnavailable::NotMoving));

        let result = estimate_eta_minutes(&oracle, RIDER, BUS, -4.0).await;
        assert_eq!(result, Err(EtaUnavailable::NotMoving));
    }

    #[tokio::test]
    async fn test_minutes_from_road_distance() {
        // 3000 m at 30 km/h = 360 s = 6 min
        let oracle = oracle_with_distance(3000);
        let result = estimate_eta_minutes(&oracle, RIDER, BUS, 30.0).await;
        assert_eq!(result, Ok(6));
    }

    #[tokio::test]
    async fn test_minutes_are_rounded() {
        // 2450 m at 30 km/h = 294 s = 4.9 min -> 5
        let oracle = oracle_with_distance(2450);
        assert_eq!(estimate_eta_minutes(&oracle, RIDER, BUS, 30.0).await, Ok(5));

        // 2200 m at 30 km/h = 264 s = 4.4 min -> 4
        let oracle = oracle_with_distance(2200);
        assert_eq!(estimate_eta_minutes(&oracle, RIDER, BUS, 30.0).await, Ok(4));
    }

    #[tokio::test]
    async fn test_oracle_failure_is_unavailable() {
        let mock = MockHttpClient::new(Err(RoutingError::HttpError("timeout".to_string())));
        let oracle = DirectionsOracle::new(mock, "k");

        let result = estimate_eta_minutes(&oracle, RIDER, BUS, 30.0).await;
        assert!(matches!(result, Err(EtaUnavailable::Unavailable(_))));
    }

    #[test]
    fn test_straight_line_eta() {
        let rider = RIDER;
        let bus = RIDER.offset_meters(3000.0, 0.0);
        assert_eq!(straight_line_eta_minutes(rider, bus, 30.0), Some(6));
        assert_eq!(straight_line_eta_minutes(rider, bus, 0.0), None);
    }

    #[tokio::test]
    async fn test_straight_line_oracle_matches_haversine() {
        let bus = RIDER.offset_meters(3000.0, 0.0);
        assert_eq!(
            estimate_eta_minutes(&StraightLineOracle, RIDER, bus, 30.0).await,
            Ok(6)
        );
    }

    #[test]
    fn test_is_stationary() {
        assert!(is_stationary(0.0));
        assert!(is_stationary(-1.0));
        assert!(is_stationary(f64::NAN));
        assert!(!is_stationary(0.5));
    }
}
