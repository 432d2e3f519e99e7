//! Display ETA engine
//!
//! Turns the routing adapter's result into the string shown to riders.
//!
//! | Condition                | Display             |
//! |--------------------------|---------------------|
//! | emergency active         | `NOT AVAILABLE`     |
//! | bus speed is zero        | `Bus is not moving` |
//! | oracle answered          | `<n> minutes`       |
//! | oracle failed            | `Not Available`     |
//!
//! Emergency status always wins, even over a successful oracle answer.

use std::fmt;

use crate::geo::Coordinate;
use crate::routing::{
    estimate_eta_minutes, straight_line_eta_minutes, EtaUnavailable, RoutingOracle,
};

/// Display string while an emergency is active.
pub const EMERGENCY_TEXT: &str = "NOT AVAILABLE";

/// Display string for a stationary bus.
pub const NOT_MOVING_TEXT: &str = "Bus is not moving";

/// Display string when no estimate could be produced.
pub const UNAVAILABLE_TEXT: &str = "Not Available";

/// ETA engine options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EtaConfig {
    /// Use a straight-line estimate when the oracle fails.
    ///
    /// Off by default: a failed oracle renders as "Not Available".
    pub straight_line_fallback: bool,
}

/// What the ETA label should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtaDisplay {
    /// The bus has an active emergency.
    Emergency,
    /// The bus is stationary.
    NotMoving,
    /// Estimated minutes until arrival.
    Minutes(u32),
    /// No estimate available.
    Unavailable,
}

impl fmt::Display for EtaDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtaDisplay::Emergency => f.write_str(EMERGENCY_TEXT),
            EtaDisplay::NotMoving => f.write_str(NOT_MOVING_TEXT),
            EtaDisplay::Minutes(n) => write!(f, "{} minutes", n),
            EtaDisplay::Unavailable => f.write_str(UNAVAILABLE_TEXT),
        }
    }
}

/// Computes the typed ETA display for one snapshot.
pub async fn compute_eta<O: RoutingOracle>(
    oracle: &O,
    config: EtaConfig,
    emergency_active: bool,
    rider: Coordinate,
    bus: Coordinate,
    speed_kmh: f64,
) -> EtaDisplay {
    if emergency_active {
        return EtaDisplay::Emergency;
    }

    match estimate_eta_minutes(oracle, rider, bus, speed_kmh).await {
        Ok(minutes) => EtaDisplay::Minutes(minutes),
        Err(EtaUnavailable::NotMoving) => EtaDisplay::NotMoving,
        Err(EtaUnavailable::Unavailable(_)) if config.straight_line_fallback => {
            straight_line_eta_minutes(rider, bus, speed_kmh)
                .map(EtaDisplay::Minutes)
                .unwrap_or(EtaDisplay::Unavailable)
        }
        Err(EtaUnavailable::Unavailable(_)) => EtaDisplay::Unavailable,
    }
}

/// Computes the ETA display string with the default configuration.
pub async fn compute_display_eta<O: RoutingOracle>(
    oracle: &O,
    emergency_active: bool,
    rider: Coordinate,
    bus: Coordinate,
    speed_kmh: f64,
) -> String {
    compute_eta(oracle, EtaConfig::default(), emergency_active, rider, bus, speed_kmh)
        .await
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{DirectionsOracle, MockHttpClient, RoutingError};

    const RIDER: Coordinate = Coordinate::new(14.6, 120.98);
    const BUS: Coordinate = Coordinate::new(14.62, 120.99);
    const OK_BODY: &str =
        r#"{"status":"OK","routes":[{"legs":[{"distance":{"value":3000}}]}]}"#;

    fn ok_oracle() -> DirectionsOracle<MockHttpClient> {
        DirectionsOracle::new(MockHttpClient::json(OK_BODY), "k")
    }

    fn failing_oracle() -> DirectionsOracle<MockHttpClient> {
        DirectionsOracle::new(
            MockHttpClient::new(Err(RoutingError::HttpError("down".to_string()))),
            "k",
        )
    }

    #[tokio::test]
    async fn test_minutes() {
        let eta = compute_display_eta(&ok_oracle(), false, RIDER, BUS, 30.0).await;
        assert_eq!(eta, "6 minutes");
    }

    #[tokio::test]
    async fn test_not_moving_regardless_of_positions() {
        let oracle = ok_oracle();
        assert_eq!(
            compute_display_eta(&oracle, false, RIDER, BUS, 0.0).await,
            "Bus is not moving"
        );
        assert_eq!(
            compute_display_eta(&oracle, false, RIDER, RIDER, 0.0).await,
            "Bus is not moving"
        );
    }

    #[tokio::test]
    async fn test_emergency_wins_over_successful_oracle() {
        let eta = compute_display_eta(&ok_oracle(), true, RIDER, BUS, 30.0).await;
        assert_eq!(eta, "NOT AVAILABLE");
    }

    struct CountingOracle {
        calls: std::cell::Cell<usize>,
    }

    impl RoutingOracle for CountingOracle {
        async fn road_distance_meters(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
        ) -> Result<f64, RoutingError> {
            self.calls.set(self.calls.get() + 1);
            Ok(1000.0)
        }
    }

    #[tokio::test]
    async fn test_emergency_and_stationary_skip_oracle_call() {
        let oracle = CountingOracle {
            calls: std::cell::Cell::new(0),
        };
        let eta = compute_eta(&oracle, EtaConfig::default(), true, RIDER, BUS, 30.0).await;
        assert_eq!(eta, EtaDisplay::Emergency);
        let eta = compute_eta(&oracle, EtaConfig::default(), false, RIDER, BUS, 0.0).await;
        assert_eq!(eta, EtaDisplay::NotMoving);
        assert_eq!(oracle.calls.get(), 0);

        compute_eta(&oracle, EtaConfig::default(), false, RIDER, BUS, 30.0).await;
        assert_eq!(oracle.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_oracle_failure_is_not_available() {
        let eta = compute_display_eta(&failing_oracle(), false, RIDER, BUS, 30.0).await;
        assert_eq!(eta, "Not Available");
    }

    #[tokio::test]
    async fn test_straight_line_fallback() {
        let config = EtaConfig {
            straight_line_fallback: true,
        };
        let bus = RIDER.offset_meters(3000.0, 0.0);
        let eta = compute_eta(&failing_oracle(), config, false, RIDER, bus, 30.0).await;
        assert_eq!(eta, EtaDisplay::Minutes(6));
    }
}
