//! External collaborators used while pairing, plus in-memory stand-ins.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Conductor lookup failure (distinct from "not found").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The directory could not be reached.
    #[error("Conductor directory unavailable: {0}")]
    Unavailable(String),
}

/// Bus record write failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The store refused the write.
    #[error("Bus record update rejected: {0}")]
    Rejected(String),

    /// The bus record does not exist.
    #[error("Bus record '{0}' not found")]
    UnknownBus(String),
}

/// A verified conductor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConductorRecord {
    pub id: String,
    pub name: String,
}

/// Partial update written to a bus record when pairing commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConductorAssignment {
    pub conductor_id: String,
    pub conductor_name: String,
}

/// Looks conductors up by id.
pub trait ConductorLookup {
    /// Returns the record, `Ok(None)` if no such conductor exists.
    async fn find_conductor(
        &self,
        conductor_id: &str,
    ) -> Result<Option<ConductorRecord>, LookupError>;
}

/// Writes conductor assignments to bus records.
///
/// The update is unconditional: concurrent assignments to the same bus are
/// last-write-wins.
pub trait BusRecordStore {
    /// Sets `conductor_id` and `conductor_name` on the bus record.
    async fn assign_conductor(
        &self,
        bus_id: &str,
        assignment: &ConductorAssignment,
    ) -> Result<(), CommitError>;
}

impl<T: ConductorLookup> ConductorLookup for &T {
    async fn find_conductor(
        &self,
        conductor_id: &str,
    ) -> Result<Option<ConductorRecord>, LookupError> {
        (**self).find_conductor(conductor_id).await
    }
}

impl<T: BusRecordStore> BusRecordStore for &T {
    async fn assign_conductor(
        &self,
        bus_id: &str,
        assignment: &ConductorAssignment,
    ) -> Result<(), CommitError> {
        (**self).assign_conductor(bus_id, assignment).await
    }
}

/// In-memory conductor directory.
#[derive(Debug, Default, Clone)]
pub struct MemoryConductorDirectory {
    conductors: HashMap<String, ConductorRecord>,
}

impl MemoryConductorDirectory {
    /// Creates a directory from records.
    pub fn new(records: impl IntoIterator<Item = ConductorRecord>) -> Self {
        Self {
            conductors: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Number of conductors.
    pub fn len(&self) -> usize {
        self.conductors.len()
    }

    /// True if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.conductors.is_empty()
    }
}

impl ConductorLookup for MemoryConductorDirectory {
    async fn find_conductor(
        &self,
        conductor_id: &str,
    ) -> Result<Option<ConductorRecord>, LookupError> {
        Ok(self.conductors.get(conductor_id).cloned())
    }
}

/// In-memory bus records.
#[derive(Debug, Default)]
pub struct MemoryBusRecords {
    assignments: Mutex<HashMap<String, Option<ConductorAssignment>>>,
    rejection: Mutex<Option<String>>,
}

impl MemoryBusRecords {
    /// Creates records for the given bus ids, none paired.
    pub fn with_buses<I, S>(bus_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            assignments: Mutex::new(bus_ids.into_iter().map(|id| (id.into(), None)).collect()),
            rejection: Mutex::new(None),
        }
    }

    /// Makes every following write fail with `reason` (or succeed again with `None`).
    pub fn set_rejection(&self, reason: Option<String>) {
        *self.rejection.lock() = reason;
    }

    /// Current assignment of a bus.
    pub fn assignment(&self, bus_id: &str) -> Option<ConductorAssignment> {
        self.assignments.lock().get(bus_id).cloned().flatten()
    }
}

impl BusRecordStore for MemoryBusRecords {
    async fn assign_conductor(
        &self,
        bus_id: &str,
        assignment: &ConductorAssignment,
    ) -> Result<(), CommitError> {
        if let Some(reason) = self.rejection.lock().clone() {
            return Err(CommitError::Rejected(reason));
        }
        let mut assignments = self.assignments.lock();
        match assignments.get_mut(bus_id) {
            Some(slot) => {
                *slot = Some(assignment.clone());
                Ok(())
            }
            None => Err(CommitError::UnknownBus(bus_id.to_string())),
        }
    }
}
