//! Alert radius and alert state types.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error for radius values outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported alert radius {0}m (supported: 1000, 3000, 5000)")]
pub struct InvalidRadius(pub String);

/// Alert radius chosen once per monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlertRadius {
    /// 1 km.
    #[default]
    OneKm,
    /// 3 km.
    ThreeKm,
    /// 5 km.
    FiveKm,
}

impl AlertRadius {
    /// Every selectable radius, smallest first.
    pub const ALL: [AlertRadius; 3] = [
        AlertRadius::OneKm,
        AlertRadius::ThreeKm,
        AlertRadius::FiveKm,
    ];

    /// Radius in meters.
    pub fn meters(&self) -> u32 {
        match self {
            AlertRadius::OneKm => 1000,
            AlertRadius::ThreeKm => 3000,
            AlertRadius::FiveKm => 5000,
        }
    }

    /// Radius in meters as a float, for distance comparisons.
    pub fn meters_f64(&self) -> f64 {
        f64::from(self.meters())
    }
}

impl TryFrom<u32> for AlertRadius {
    type Error = InvalidRadius;

    fn try_from(meters: u32) -> Result<Self, Self::Error> {
        AlertRadius::ALL
            .into_iter()
            .find(|r| r.meters() == meters)
            .ok_or_else(|| InvalidRadius(meters.to_string()))
    }
}

impl FromStr for AlertRadius {
    type Err = InvalidRadius;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let meters: u32 = s.trim().parse().map_err(|_| InvalidRadius(s.to_string()))?;
        AlertRadius::try_from(meters)
    }
}

impl fmt::Display for AlertRadius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.meters())
    }
}

/// Proximity alert state for one monitoring session.
///
/// ```text
/// Armed --[d <= radius]--> Triggered
/// Triggered --[acknowledge]--> Suppressed
/// Suppressed --[d > radius]--> Armed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProximityAlertState {
    /// Waiting for the bus to enter the radius.
    #[default]
    Armed,
    /// The bus entered the radius; alert raised and not yet acknowledged.
    Triggered,
    /// Alert acknowledged; waits for the bus to leave before re-arming.
    Suppressed,
}

impl ProximityAlertState {
    /// Human-readable name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProximityAlertState::Armed => "armed",
            ProximityAlertState::Triggered => "triggered",
            ProximityAlertState::Suppressed => "suppressed",
        }
    }
}

impl fmt::Display for ProximityAlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_meters() {
        assert_eq!(AlertRadius::OneKm.meters(), 1000);
        assert_eq!(AlertRadius::ThreeKm.meters(), 3000);
        assert_eq!(AlertRadius::FiveKm.meters(), 5000);
        assert_eq!(AlertRadius::default(), AlertRadius::OneKm);
    }

    #[test]
    fn test_radius_try_from() {
        assert_eq!(AlertRadius::try_from(3000), Ok(AlertRadius::ThreeKm));
        assert!(AlertRadius::try_from(2000).is_err());
    }

    #[test]
    fn test_radius_from_str() {
        assert_eq!("5000".parse::<AlertRadius>(), Ok(AlertRadius::FiveKm));
        assert!("five".parse::<AlertRadius>().is_err());
        assert_eq!(AlertRadius::FiveKm.to_string(), "5000m");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ProximityAlertState::Suppressed.to_string(), "suppressed");
        assert_eq!(ProximityAlertState::default(), ProximityAlertState::Armed);
    }
}
