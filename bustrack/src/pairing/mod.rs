//! Conductor-to-bus pairing via QR scan.
//!
//! A conductor presents a QR code encoding their identity. The operator
//! scans it, the conductor is verified against the directory, the operator
//! confirms, and the bus record is updated.
//!
//! # Components
//!
//! - [`parse_payload`]: decodes the scanned text
//! - [`PairingStateMachine`]: synchronous flow with tickets for async work
//! - [`PairingController`]: runs lookups and commits against
//!   [`ConductorLookup`] and [`BusRecordStore`]

mod collaborators;
mod controller;
mod machine;
mod payload;

pub use collaborators::{
    BusRecordStore, CommitError, ConductorAssignment, ConductorLookup, ConductorRecord,
    LookupError, MemoryBusRecords, MemoryConductorDirectory,
};
pub use controller::{PairingController, ScanOutcome};
pub use machine::{
    CommitTicket, DropReason, LookupOutcome, LookupTicket, PairingNotice, PairingState,
    PairingStateMachine, ScanDisposition,
};
pub use payload::{parse_payload, DecodedPairingPayload, PayloadError};

use thiserror::Error;

/// Errors from driving the pairing flow out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    /// Confirm was called with no verified conductor.
    #[error("No conductor awaiting confirmation (state: {0})")]
    NotConfirming(PairingState),

    /// The flow was reset while the commit was in flight.
    #[error("Pairing was reset before the commit completed")]
    Reset,
}
