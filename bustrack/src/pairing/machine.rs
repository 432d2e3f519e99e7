//! Pairing state machine.
//!
//! ```text
//!            scan accepted           lookup hit
//!   Idle ─────────────────► Verifying ─────────► Confirming
//!    ▲                          │                 │      │
//!    │        lookup miss/error │          cancel │      │ confirm
//!    ├──────────────────────────┘                 │      ▼
//!    ├────────────────────────────────────────────┘  Committing
//!    │               commit success / failure            │
//!    └───────────────────────────────────────────────────┘
//! ```
//!
//! The machine is synchronous. Asynchronous work (lookup, commit) is started
//! by the caller using the ticket the machine hands out and its result is fed
//! back in. A ticket from before a [`PairingStateMachine::reset`] is stale and
//! its result is discarded.
//!
//! Scanning is enabled only in `Idle`, so at most one lookup can be in flight.

use std::fmt;

use tracing::{debug, info, warn};

use super::collaborators::{CommitError, ConductorAssignment, ConductorRecord, LookupError};
use super::payload::{parse_payload, DecodedPairingPayload, PayloadError};
use super::PairingError;
use crate::scan::{is_within_viewport, ScanEvent, ScanViewport};

/// Pairing flow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingState {
    /// Waiting for a scan.
    #[default]
    Idle,
    /// Conductor lookup in flight.
    Verifying,
    /// Waiting for the user to confirm.
    Confirming,
    /// Bus record write in flight.
    Committing,
}

impl PairingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Verifying => "verifying",
            Self::Confirming => "confirming",
            Self::Committing => "committing",
        }
    }
}

impl fmt::Display for PairingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a scan event was dropped without starting a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The event carried no codes.
    NoCodes,
    /// No code lay fully inside the scan viewport.
    OutOfViewport,
    /// The in-viewport code did not decode to a pairing payload.
    Unparseable(PayloadError),
}

/// Result of offering a scan event to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanDisposition {
    /// A pairing attempt is already in progress.
    Ignored(PairingState),
    /// Nothing usable in the event.
    Dropped(DropReason),
    /// A lookup should be started for this ticket.
    Accepted(LookupTicket),
}

/// Handle for one conductor lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    epoch: u64,
    /// Conductor id to look up.
    pub conductor_id: String,
}

/// Handle for one bus record write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTicket {
    epoch: u64,
    /// Bus being paired.
    pub bus_id: String,
    /// Fields to write.
    pub assignment: ConductorAssignment,
}

/// User-visible message produced by the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingNotice {
    /// The scanned conductor id does not exist.
    ConductorNotFound { conductor_id: String },
    /// The conductor directory could not be queried.
    LookupFailed(String),
    /// The bus record now names the conductor.
    Paired {
        bus_id: String,
        conductor_name: String,
    },
    /// The bus record write failed.
    CommitFailed(String),
}

impl PairingNotice {
    /// True for the success notice.
    pub fn is_paired(&self) -> bool {
        matches!(self, Self::Paired { .. })
    }
}

impl fmt::Display for PairingNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConductorNotFound { conductor_id } => {
                write!(f, "Conductor not found ({})", conductor_id)
            }
            Self::LookupFailed(reason) => write!(f, "Could not verify conductor: {}", reason),
            Self::Paired {
                bus_id,
                conductor_name,
            } => write!(f, "{} is now paired with bus {}", conductor_name, bus_id),
            Self::CommitFailed(reason) => write!(f, "Pairing failed: {}", reason),
        }
    }
}

/// Result of feeding a lookup result back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Conductor verified; awaiting user confirmation.
    AwaitingConfirmation(ConductorRecord),
    /// Back to idle with a notice for the user.
    Rejected(PairingNotice),
    /// The ticket predates a reset.
    Stale,
}

/// The pairing flow for one bus.
#[derive(Debug)]
pub struct PairingStateMachine {
    bus_id: String,
    state: PairingState,
    candidate: Option<DecodedPairingPayload>,
    verified: Option<ConductorRecord>,
    epoch: u64,
}

impl PairingStateMachine {
    /// Creates an idle machine pairing conductors to `bus_id`.
    pub fn new(bus_id: impl Into<String>) -> Self {
        Self {
            bus_id: bus_id.into(),
            state: PairingState::Idle,
            candidate: None,
            verified: None,
            epoch: 0,
        }
    }

    pub fn bus_id(&self) -> &str {
        &self.bus_id
    }

    pub fn state(&self) -> PairingState {
        self.state
    }

    /// Scanning is enabled only while idle.
    pub fn scanning_enabled(&self) -> bool {
        self.state == PairingState::Idle
    }

    /// Payload decoded from the accepted scan, if any.
    pub fn candidate(&self) -> Option<&DecodedPairingPayload> {
        self.candidate.as_ref()
    }

    /// Conductor awaiting confirmation, if any.
    pub fn verified(&self) -> Option<&ConductorRecord> {
        self.verified.as_ref()
    }

    /// Offers a scan event.
    ///
    /// The first code lying fully inside the viewport that decodes to a
    /// payload is accepted.
    pub fn on_scan(&mut self, event: &ScanEvent, viewport: &ScanViewport) -> ScanDisposition {
        if !self.scanning_enabled() {
            debug!(state = %self.state, "Scan ignored while pairing in progress");
            return ScanDisposition::Ignored(self.state);
        }

        let mut reason = DropReason::NoCodes;
        for code in &event.codes {
            if !is_within_viewport(&code.corners, viewport) {
                if reason == DropReason::NoCodes {
                    reason = DropReason::OutOfViewport;
                }
                continue;
            }
            match parse_payload(&code.value) {
                Ok(payload) => {
                    info!(
                        bus_id = %self.bus_id,
                        conductor_id = %payload.conductor_id,
                        "Verifying scanned conductor"
                    );
                    let ticket = LookupTicket {
                        epoch: self.epoch,
                        conductor_id: payload.conductor_id.clone(),
                    };
                    self.candidate = Some(payload);
                    self.state = PairingState::Verifying;
                    return ScanDisposition::Accepted(ticket);
                }
                Err(e) => {
                    debug!(error = %e, "Dropped unparseable code");
                    reason = DropReason::Unparseable(e);
                }
            }
        }
        ScanDisposition::Dropped(reason)
    }

    /// Feeds back the result of a lookup.
    pub fn on_lookup_result(
        &mut self,
        ticket: &LookupTicket,
        result: Result<Option<ConductorRecord>, LookupError>,
    ) -> LookupOutcome {
        if ticket.epoch != self.epoch || self.state != PairingState::Verifying {
            debug!(conductor_id = %ticket.conductor_id, "Discarding stale lookup result");
            return LookupOutcome::Stale;
        }

        match result {
            Ok(Some(record)) => {
                info!(conductor_id = %record.id, "Conductor verified, awaiting confirmation");
                self.verified = Some(record.clone());
                self.state = PairingState::Confirming;
                LookupOutcome::AwaitingConfirmation(record)
            }
            Ok(None) => {
                warn!(conductor_id = %ticket.conductor_id, "Scanned conductor not found");
                self.clear();
                LookupOutcome::Rejected(PairingNotice::ConductorNotFound {
                    conductor_id: ticket.conductor_id.clone(),
                })
            }
            Err(e) => {
                warn!(conductor_id = %ticket.conductor_id, error = %e, "Conductor lookup failed");
                self.clear();
                LookupOutcome::Rejected(PairingNotice::LookupFailed(e.to_string()))
            }
        }
    }

    /// Declines the verified conductor. Returns false outside `Confirming`.
    pub fn cancel(&mut self) -> bool {
        if self.state != PairingState::Confirming {
            return false;
        }
        debug!(bus_id = %self.bus_id, "Pairing cancelled by user");
        self.clear();
        true
    }

    /// Accepts the verified conductor and hands out the write to perform.
    pub fn confirm(&mut self) -> Result<CommitTicket, PairingError> {
        let record = match (self.state, &self.verified) {
            (PairingState::Confirming, Some(record)) => record.clone(),
            (state, _) => return Err(PairingError::NotConfirming(state)),
        };

        self.state = PairingState::Committing;
        Ok(CommitTicket {
            epoch: self.epoch,
            bus_id: self.bus_id.clone(),
            assignment: ConductorAssignment {
                conductor_id: record.id,
                conductor_name: record.name,
            },
        })
    }

    /// Feeds back the result of the bus record write.
    ///
    /// Success and failure both return to `Idle`. Returns `None` for a stale
    /// ticket.
    pub fn on_commit_result(
        &mut self,
        ticket: &CommitTicket,
        result: Result<(), CommitError>,
    ) -> Option<PairingNotice> {
        if ticket.epoch != self.epoch || self.state != PairingState::Committing {
            debug!(bus_id = %ticket.bus_id, "Discarding stale commit result");
            return None;
        }

        self.clear();
        match result {
            Ok(()) => {
                info!(
                    bus_id = %ticket.bus_id,
                    conductor_id = %ticket.assignment.conductor_id,
                    "Conductor paired with bus"
                );
                Some(PairingNotice::Paired {
                    bus_id: ticket.bus_id.clone(),
                    conductor_name: ticket.assignment.conductor_name.clone(),
                })
            }
            Err(e) => {
                warn!(bus_id = %ticket.bus_id, error = %e, "Pairing commit failed");
                Some(PairingNotice::CommitFailed(e.to_string()))
            }
        }
    }

    /// Returns to `Idle` and invalidates outstanding tickets.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.clear();
    }

    fn clear(&mut self) {
        self.state = PairingState::Idle;
        self.candidate = None;
        self.verified = None;
    }
}
