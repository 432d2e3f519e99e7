//! Location/status records as delivered by the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::snapshot::BusSnapshot;
use super::FeedError;
use crate::geo::Coordinate;

/// Position object inside a location record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// One pushed location/status record for a bus.
///
/// Field names follow the store's camelCase document layout. Only
/// `position`, `speedKmh`, `timestamp` and `emergencyStatus` reach the
/// engine; the rest is carried for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    /// Reported position.
    pub position: RecordPosition,
    /// Ground speed in km/h.
    #[serde(default)]
    pub speed_kmh: f64,
    /// Report time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Whether the driver has raised an emergency.
    #[serde(default)]
    pub emergency_status: bool,
    /// Route-facing bus number.
    #[serde(default)]
    pub bus_number: Option<String>,
    /// License plate.
    #[serde(default)]
    pub license_plate: Option<String>,
    /// Seat capacity.
    #[serde(default)]
    pub seat_count: Option<u32>,
}

impl LocationRecord {
    /// Validates the record and converts it into a snapshot for `bus_id`.
    ///
    /// Out-of-range coordinates, negative or non-finite speeds and
    /// unrepresentable timestamps are rejected here so nothing downstream
    /// has to validate again.
    pub fn into_snapshot(self, bus_id: impl Into<String>) -> Result<BusSnapshot, FeedError> {
        let position = Coordinate::try_new(self.position.latitude, self.position.longitude)?;

        if !self.speed_kmh.is_finite() || self.speed_kmh < 0.0 {
            return Err(FeedError::InvalidSpeed(self.speed_kmh));
        }

        let timestamp: DateTime<Utc> = DateTime::from_timestamp_millis(self.timestamp)
            .ok_or(FeedError::InvalidTimestamp(self.timestamp))?;

        Ok(BusSnapshot {
            bus_id: bus_id.into(),
            position,
            speed_kmh: self.speed_kmh,
            timestamp,
            emergency_active: self.emergency_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::CoordError;

    const RECORD_JSON: &str = r#"{
        "position": { "latitude": 14.6, "longitude": 120.98 },
        "speedKmh": 30.5,
        "timestamp": 1700000000000,
        "emergencyStatus": false,
        "busNumber": "B-12",
        "licensePlate": "NAB 1234",
        "seatCount": 45
    }"#;

    #[test]
    fn test_deserialize_store_record() {
        let record: LocationRecord = serde_json::from_str(RECORD_JSON).unwrap();
        assert_eq!(record.speed_kmh, 30.5);
        assert_eq!(record.bus_number.as_deref(), Some("B-12"));
        assert_eq!(record.seat_count, Some(45));
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{ "position": { "latitude": 1.0, "longitude": 2.0 }, "timestamp": 5 }"#;
        let record: LocationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.speed_kmh, 0.0);
        assert!(!record.emergency_status);
        assert!(record.bus_number.is_none());
    }

    #[test]
    fn test_into_snapshot() {
        let record: LocationRecord = serde_json::from_str(RECORD_JSON).unwrap();
        let snapshot = record.into_snapshot("bus-1").unwrap();
        assert_eq!(snapshot.bus_id, "bus-1");
        assert_eq!(snapshot.position, Coordinate::new(14.6, 120.98));
        assert_eq!(snapshot.timestamp.timestamp_millis(), 1_700_000_000_000);
        assert!(!snapshot.emergency_active);
    }

    #[test]
    fn test_into_snapshot_rejects_bad_coordinates() {
        let mut record: LocationRecord = serde_json::from_str(RECORD_JSON).unwrap();
        record.position.latitude = 91.0;
        assert!(matches!(
            record.into_snapshot("bus-1"),
            Err(FeedError::InvalidPosition(CoordError::InvalidLatitude(_)))
        ));
    }

    #[test]
    fn test_into_snapshot_rejects_negative_speed() {
        let mut record: LocationRecord = serde_json::from_str(RECORD_JSON).unwrap();
        record.speed_kmh = -3.0;
        assert!(matches!(
            record.into_snapshot("bus-1"),
            Err(FeedError::InvalidSpeed(_))
        ));
    }
}
