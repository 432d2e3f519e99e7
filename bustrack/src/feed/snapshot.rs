//! Bus snapshots and last-write-wins ordering.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::geo::Coordinate;

/// Validated location/status of one bus at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct BusSnapshot {
    /// Store identifier of the bus.
    pub bus_id: String,
    /// Reported position.
    pub position: Coordinate,
    /// Ground speed in km/h (never negative).
    pub speed_kmh: f64,
    /// When the bus reported this position.
    pub timestamp: DateTime<Utc>,
    /// Whether the driver has raised an emergency.
    pub emergency_active: bool,
}

/// Outcome of offering a snapshot to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// The snapshot is now the current one for its bus.
    Applied,
    /// The snapshot is older than the current one and was discarded.
    Stale,
}

/// Latest snapshot per bus, ordered by report timestamp.
///
/// Delivery order from the push source is not trusted. A snapshot older than
/// the one already applied for the same bus is discarded; equal timestamps
/// are applied.
#[derive(Debug, Default)]
pub struct SnapshotLedger {
    latest: HashMap<String, BusSnapshot>,
}

impl SnapshotLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a snapshot if it is not older than the current one.
    pub fn apply(&mut self, snapshot: BusSnapshot) -> LedgerOutcome {
        if let Some(current) = self.latest.get(&snapshot.bus_id) {
            if snapshot.timestamp < current.timestamp {
                tracing::debug!(
                    bus_id = %snapshot.bus_id,
                    stale = %snapshot.timestamp,
                    current = %current.timestamp,
                    "Discarding out-of-order snapshot"
                );
                return LedgerOutcome::Stale;
            }
        }
        self.latest.insert(snapshot.bus_id.clone(), snapshot);
        LedgerOutcome::Applied
    }

    /// Current snapshot for a bus.
    pub fn latest(&self, bus_id: &str) -> Option<&BusSnapshot> {
        self.latest.get(bus_id)
    }

    /// Number of buses with a snapshot.
    pub fn len(&self) -> usize {
        self.latest.len()
    }

    /// True if no snapshot has been applied.
    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    /// Forgets all snapshots.
    pub fn clear(&mut self) {
        self.latest.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(bus_id: &str, millis: i64, lat: f64) -> BusSnapshot {
        BusSnapshot {
            bus_id: bus_id.to_string(),
            position: Coordinate::new(lat, 120.98),
            speed_kmh: 30.0,
            timestamp: DateTime::from_timestamp_millis(millis).unwrap(),
            emergency_active: false,
        }
    }

    #[test]
    fn test_newer_snapshot_replaces_older() {
        let mut ledger = SnapshotLedger::new();
        assert_eq!(ledger.apply(snapshot("a", 1000, 14.0)), LedgerOutcome::Applied);
        assert_eq!(ledger.apply(snapshot("a", 2000, 14.1)), LedgerOutcome::Applied);
        assert_eq!(ledger.latest("a").unwrap().position.latitude, 14.1);
    }

    #[test]
    fn test_older_snapshot_is_discarded() {
        let mut ledger = SnapshotLedger::new();
        ledger.apply(snapshot("a", 2000, 14.1));
        assert_eq!(ledger.apply(snapshot("a", 1000, 14.0)), LedgerOutcome::Stale);
        assert_eq!(ledger.latest("a").unwrap().position.latitude, 14.1);
    }

    #[test]
    fn test_equal_timestamp_is_applied() {
        let mut ledger = SnapshotLedger::new();
        ledger.apply(snapshot("a", 2000, 14.1));
        assert_eq!(ledger.apply(snapshot("a", 2000, 14.2)), LedgerOutcome::Applied);
        assert_eq!(ledger.latest("a").unwrap().position.latitude, 14.2);
    }

    #[test]
    fn test_buses_are_independent() {
        let mut ledger = SnapshotLedger::new();
        ledger.apply(snapshot("a", 5000, 14.0));
        assert_eq!(ledger.apply(snapshot("b", 1000, 15.0)), LedgerOutcome::Applied);
        assert_eq!(ledger.len(), 2);

        ledger.clear();
        assert!(ledger.is_empty());
    }
}
