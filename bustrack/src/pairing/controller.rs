//! Async driver for the pairing flow.
//!
//! Owns the [`PairingStateMachine`] behind a mutex and runs lookups and
//! commits against the collaborators. The lock is never held across an
//! await, so scan callbacks arriving while a lookup is in flight see
//! `Verifying` and are ignored.

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use super::collaborators::{BusRecordStore, ConductorLookup, ConductorRecord};
use super::machine::{
    DropReason, LookupOutcome, PairingNotice, PairingState, PairingStateMachine, ScanDisposition,
};
use super::PairingError;
use crate::scan::{ScanEvent, ScanViewport};

/// What happened to a scan event after any lookup completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A pairing attempt was already in progress.
    Ignored,
    /// Nothing usable in the event.
    Dropped(DropReason),
    /// Conductor verified; call [`PairingController::confirm`] or
    /// [`PairingController::cancel`].
    AwaitingConfirmation(ConductorRecord),
    /// Lookup did not verify the conductor. Scanning is enabled again.
    Rejected(PairingNotice),
    /// The flow was reset while the lookup was in flight.
    Abandoned,
}

/// Pairing flow for one bus against a conductor directory and bus records.
pub struct PairingController<L, S> {
    machine: Mutex<PairingStateMachine>,
    viewport: Mutex<ScanViewport>,
    lookup: L,
    store: S,
    notices: Option<mpsc::UnboundedSender<PairingNotice>>,
}

impl<L, S> PairingController<L, S>
where
    L: ConductorLookup,
    S: BusRecordStore,
{
    /// Creates an idle controller.
    pub fn new(bus_id: impl Into<String>, viewport: ScanViewport, lookup: L, store: S) -> Self {
        Self {
            machine: Mutex::new(PairingStateMachine::new(bus_id)),
            viewport: Mutex::new(viewport),
            lookup,
            store,
            notices: None,
        }
    }

    /// Sends every user-visible notice to `sender`.
    pub fn with_notices(mut self, sender: mpsc::UnboundedSender<PairingNotice>) -> Self {
        self.notices = Some(sender);
        self
    }

    pub fn state(&self) -> PairingState {
        self.machine.lock().state()
    }

    pub fn scanning_enabled(&self) -> bool {
        self.machine.lock().scanning_enabled()
    }

    pub fn viewport(&self) -> ScanViewport {
        *self.viewport.lock()
    }

    /// Replaces the scan window, e.g. after the display size changed.
    pub fn set_viewport(&self, viewport: ScanViewport) {
        *self.viewport.lock() = viewport;
    }

    /// Handles one scanner callback.
    ///
    /// Accepted scans run the conductor lookup before returning.
    pub async fn handle_scan(&self, event: &ScanEvent) -> ScanOutcome {
        let viewport = self.viewport();
        let disposition = self.machine.lock().on_scan(event, &viewport);

        let ticket = match disposition {
            ScanDisposition::Accepted(ticket) => ticket,
            ScanDisposition::Ignored(_) => return ScanOutcome::Ignored,
            ScanDisposition::Dropped(reason) => return ScanOutcome::Dropped(reason),
        };

        let result = self.lookup.find_conductor(&ticket.conductor_id).await;
        let outcome = self.machine.lock().on_lookup_result(&ticket, result);

        match outcome {
            LookupOutcome::AwaitingConfirmation(record) => {
                ScanOutcome::AwaitingConfirmation(record)
            }
            LookupOutcome::Rejected(notice) => {
                self.notify(notice.clone());
                ScanOutcome::Rejected(notice)
            }
            LookupOutcome::Stale => ScanOutcome::Abandoned,
        }
    }

    /// Declines the verified conductor.
    pub fn cancel(&self) -> bool {
        self.machine.lock().cancel()
    }

    /// Confirms the verified conductor and writes the assignment.
    ///
    /// Returns the resulting notice; a failed write is `Ok` with
    /// [`PairingNotice::CommitFailed`] since the flow itself recovered.
    pub async fn confirm(&self) -> Result<PairingNotice, PairingError> {
        let ticket = self.machine.lock().confirm()?;

        let result = self
            .store
            .assign_conductor(&ticket.bus_id, &ticket.assignment)
            .await;
        let notice = self
            .machine
            .lock()
            .on_commit_result(&ticket, result)
            .ok_or(PairingError::Reset)?;

        self.notify(notice.clone());
        Ok(notice)
    }

    /// Abandons any attempt in progress, e.g. when the screen closes.
    pub fn reset(&self) {
        self.machine.lock().reset();
    }

    fn notify(&self, notice: PairingNotice) {
        if let Some(sender) = &self.notices {
            if sender.send(notice).is_err() {
                debug!("Pairing notice receiver dropped");
            }
        }
    }
}
