//! Monitor configuration and published view types.

use crate::eta::{EtaConfig, EtaDisplay};
use crate::feed::BusSnapshot;
use crate::proximity::{AlertRadius, AlertTransition, ProximityAlertState};

/// Configuration for one monitoring session.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Bus being watched.
    pub bus_id: String,
    /// Alert radius chosen for the session.
    pub radius: AlertRadius,
    /// ETA engine options.
    pub eta: EtaConfig,
}

impl MonitorConfig {
    /// Creates a config with the default ETA options.
    pub fn new(bus_id: impl Into<String>, radius: AlertRadius) -> Self {
        Self {
            bus_id: bus_id.into(),
            radius,
            eta: EtaConfig::default(),
        }
    }

    /// Sets the ETA options.
    pub fn with_eta(mut self, eta: EtaConfig) -> Self {
        self.eta = eta;
        self
    }
}

/// What the rider screen renders, republished after every change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitorView {
    /// Current alert state.
    pub alert_state: ProximityAlertState,
    /// Number of alerts raised in this session.
    pub alerts_fired: u64,
    /// Latest rider-to-bus distance.
    pub distance_m: Option<f64>,
    /// Latest ETA, once one has been computed.
    pub eta: Option<EtaDisplay>,
    /// Latest applied snapshot.
    pub last_snapshot: Option<BusSnapshot>,
}

impl MonitorView {
    /// ETA label, or `None` before the first estimate.
    pub fn eta_text(&self) -> Option<String> {
        self.eta.map(|eta| eta.to_string())
    }
}

/// What happened to a snapshot offered to the monitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapshotOutcome {
    /// Applied. Carries the alert transition when the rider position is known.
    Applied(Option<AlertTransition>),
    /// Older than the current snapshot; discarded.
    Stale,
    /// Belongs to a bus this session is not watching.
    OtherBus,
    /// The session has been closed.
    Closed,
}

impl SnapshotOutcome {
    /// True if the snapshot became current.
    pub fn is_applied(&self) -> bool {
        matches!(self, SnapshotOutcome::Applied(_))
    }
}
