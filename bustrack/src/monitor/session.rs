//! Monitoring session for one rider watching one bus.

use futures::future::{FutureExt, LocalBoxFuture};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::view::{MonitorConfig, MonitorView, SnapshotOutcome};
use crate::eta::{compute_eta, EtaDisplay};
use crate::feed::{
    subscribe_channel, BusSnapshot, FeedEvent, LedgerOutcome, LocationFeed, SnapshotLedger,
};
use crate::geo::Coordinate;
use crate::proximity::{AlertRadius, ProximityTracker};
use crate::routing::RoutingOracle;

/// Mutable session state. Locked briefly, never across an await.
#[derive(Debug)]
struct MonitorState {
    ledger: SnapshotLedger,
    proximity: ProximityTracker,
    rider: Option<Coordinate>,
    distance_m: Option<f64>,
    eta: Option<EtaDisplay>,
    /// Sequence number of the most recently started ETA request.
    eta_seq: u64,
    alerts_fired: u64,
}

/// Derives alert and ETA state for one bus from its location stream.
///
/// Proximity is evaluated synchronously on every applied snapshot. ETA
/// requests are asynchronous; [`run`](Self::run) keeps at most one in flight
/// and keeps applying snapshots while it is pending.
///
/// # Example
///
/// ```ignore
/// let monitor = BusMonitor::new(MonitorConfig::new("bus-7", AlertRadius::ThreeKm), oracle);
/// monitor.set_rider_position(rider);
/// let mut view = monitor.watch();
///
/// // Drive from the feed until the screen closes
/// monitor.run(&feed).await;
/// ```
pub struct BusMonitor<O: RoutingOracle> {
    config: MonitorConfig,
    oracle: O,
    state: Mutex<MonitorState>,
    view_tx: watch::Sender<MonitorView>,
    cancellation: CancellationToken,
}

impl<O: RoutingOracle> BusMonitor<O> {
    /// Creates an armed session.
    pub fn new(config: MonitorConfig, oracle: O) -> Self {
        let (view_tx, _) = watch::channel(MonitorView::default());
        Self {
            state: Mutex::new(MonitorState {
                ledger: SnapshotLedger::new(),
                proximity: ProximityTracker::new(config.radius),
                rider: None,
                distance_m: None,
                eta: None,
                eta_seq: 0,
                alerts_fired: 0,
            }),
            config,
            oracle,
            view_tx,
            cancellation: CancellationToken::new(),
        }
    }

    /// Session configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Routing oracle used for ETA requests.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Subscribes to view updates.
    pub fn watch(&self) -> watch::Receiver<MonitorView> {
        self.view_tx.subscribe()
    }

    /// Current view.
    pub fn view(&self) -> MonitorView {
        self.view_tx.borrow().clone()
    }

    /// True once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Updates the rider's position. Takes effect on the next snapshot.
    pub fn set_rider_position(&self, rider: Coordinate) {
        self.state.lock().rider = Some(rider);
    }

    /// Applies one snapshot and re-evaluates proximity.
    pub fn apply_snapshot(&self, snapshot: BusSnapshot) -> SnapshotOutcome {
        if self.is_closed() {
            return SnapshotOutcome::Closed;
        }
        if snapshot.bus_id != self.config.bus_id {
            return SnapshotOutcome::OtherBus;
        }

        let mut state = self.state.lock();
        let bus = snapshot.position;
        if state.ledger.apply(snapshot) == LedgerOutcome::Stale {
            return SnapshotOutcome::Stale;
        }

        let rider = state.rider;
        let transition = rider.map(|rider| state.proximity.observe(rider, bus));
        if let Some(t) = transition {
            state.distance_m = Some(t.distance_m);
            if t.fired() {
                state.alerts_fired += 1;
            }
        }

        self.publish(&state);
        SnapshotOutcome::Applied(transition)
    }

    /// Acknowledges a raised alert. Returns false if none was raised.
    pub fn acknowledge_alert(&self) -> bool {
        let mut state = self.state.lock();
        let acknowledged = state.proximity.acknowledge();
        if acknowledged {
            debug!(bus_id = %self.config.bus_id, "Proximity alert acknowledged");
            self.publish(&state);
        }
        acknowledged
    }

    /// Re-arms the session with a new radius.
    pub fn reset(&self, radius: AlertRadius) {
        let mut state = self.state.lock();
        state.proximity.reset(radius);
        info!(bus_id = %self.config.bus_id, radius = %radius, "Proximity alert reset");
        self.publish(&state);
    }

    /// Requests a fresh ETA for the current snapshot.
    ///
    /// Returns `None` without a request when there is no snapshot or rider
    /// position yet. A result is dropped (and `None` returned) if the session
    /// closes while the request is pending or a newer request has started
    /// since.
    pub async fn refresh_eta(&self) -> Option<EtaDisplay> {
        let (seq, rider, snapshot) = {
            let mut state = self.state.lock();
            if self.is_closed() {
                return None;
            }
            let rider = state.rider?;
            let snapshot = state.ledger.latest(&self.config.bus_id)?.clone();
            state.eta_seq += 1;
            (state.eta_seq, rider, snapshot)
        };

        let eta = tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => return None,
            eta = compute_eta(
                &self.oracle,
                self.config.eta,
                snapshot.emergency_active,
                rider,
                snapshot.position,
                snapshot.speed_kmh,
            ) => eta,
        };

        let mut state = self.state.lock();
        if self.is_closed() || seq != state.eta_seq {
            debug!(seq, latest = state.eta_seq, "Discarding superseded ETA result");
            return None;
        }
        state.eta = Some(eta);
        self.publish(&state);
        Some(eta)
    }

    /// Tears the session down.
    ///
    /// Pending ETA requests resolve to nothing and further snapshots are
    /// refused. [`run`](Self::run) returns and unsubscribes.
    pub fn close(&self) {
        if !self.cancellation.is_cancelled() {
            info!(bus_id = %self.config.bus_id, "Monitoring session closed");
            self.cancellation.cancel();
        }
    }

    /// Drives the session from a location feed until closed.
    pub async fn run<F: LocationFeed + ?Sized>(&self, feed: &F) {
        let (subscription, mut events) = subscribe_channel(feed);
        info!(
            bus_id = %self.config.bus_id,
            radius = %self.config.radius,
            "Monitoring session started"
        );

        let mut in_flight: Option<LocalBoxFuture<'_, ()>> = None;
        let mut refresh_pending = false;

        loop {
            tokio::select! {
                _ = self.cancellation.cancelled() => break,
                event = events.recv() => match event {
                    Some(FeedEvent::Update(snapshot)) => {
                        if self.apply_snapshot(snapshot).is_applied() {
                            if in_flight.is_none() {
                                in_flight = Some(self.refresh_eta().map(|_| ()).boxed_local());
                            } else {
                                refresh_pending = true;
                            }
                        }
                    }
                    Some(FeedEvent::Error(error)) => {
                        warn!(bus_id = %self.config.bus_id, error = %error, "Location feed error");
                    }
                    None => break,
                },
                _ = async {
                    match in_flight.as_mut() {
                        Some(request) => request.await,
                        None => std::future::pending().await,
                    }
                }, if in_flight.is_some() => {
                    in_flight = if std::mem::take(&mut refresh_pending) {
                        Some(self.refresh_eta().map(|_| ()).boxed_local())
                    } else {
                        None
                    };
                }
            }
        }

        drop(in_flight);
        subscription.unsubscribe();
        debug!(bus_id = %self.config.bus_id, "Monitoring loop stopped");
    }

    fn publish(&self, state: &MonitorState) {
        let view = MonitorView {
            alert_state: state.proximity.state(),
            alerts_fired: state.alerts_fired,
            distance_m: state.distance_m,
            eta: state.eta,
            last_snapshot: state.ledger.latest(&self.config.bus_id).cloned(),
        };
        self.view_tx.send_replace(view);
    }
}

impl<O: RoutingOracle> std::fmt::Debug for BusMonitor<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusMonitor")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::InProcessFeed;
    use crate::proximity::ProximityAlertState;
    use crate::routing::RoutingError;
    use chrono::DateTime;
    use std::cell::Cell;
    use tokio::sync::Notify;

    const RIDER: Coordinate = Coordinate::new(14.6000, 120.9800);

    /// Oracle that waits for a permit before answering.
    struct GatedOracle {
        gate: Notify,
        calls: Cell<usize>,
        meters: f64,
    }

    impl GatedOracle {
        fn new(meters: f64) -> Self {
            Self {
                gate: Notify::new(),
                calls: Cell::new(0),
                meters,
            }
        }
    }

    impl RoutingOracle for GatedOracle {
        async fn road_distance_meters(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
        ) -> Result<f64, RoutingError> {
            self.calls.set(self.calls.get() + 1);
            self.gate.notified().await;
            Ok(self.meters)
        }
    }

    /// Oracle that answers immediately.
    struct InstantOracle(f64);

    impl RoutingOracle for InstantOracle {
        async fn road_distance_meters(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
        ) -> Result<f64, RoutingError> {
            Ok(self.0)
        }
    }

    fn snapshot(millis: i64, north_m: f64, speed_kmh: f64) -> BusSnapshot {
        BusSnapshot {
            bus_id: "bus-7".to_string(),
            position: RIDER.offset_meters(north_m, 0.0),
            speed_kmh,
            timestamp: DateTime::from_timestamp_millis(millis).unwrap(),
            emergency_active: false,
        }
    }

    fn monitor<O: RoutingOracle>(oracle: O) -> BusMonitor<O> {
        let monitor = BusMonitor::new(MonitorConfig::new("bus-7", AlertRadius::OneKm), oracle);
        monitor.set_rider_position(RIDER);
        monitor
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_apply_snapshot_evaluates_proximity() {
        let monitor = monitor(InstantOracle(0.0));

        assert!(monitor.apply_snapshot(snapshot(1, 1500.0, 30.0)).is_applied());
        assert_eq!(monitor.view().alert_state, ProximityAlertState::Armed);

        monitor.apply_snapshot(snapshot(2, 900.0, 30.0));
        let view = monitor.view();
        assert_eq!(view.alert_state, ProximityAlertState::Triggered);
        assert_eq!(view.alerts_fired, 1);
        assert!((view.distance_m.unwrap() - 900.0).abs() < 1.0);
    }

    #[test]
    fn test_stale_and_foreign_snapshots_are_ignored() {
        let monitor = monitor(InstantOracle(0.0));
        monitor.apply_snapshot(snapshot(2000, 1500.0, 30.0));

        assert_eq!(
            monitor.apply_snapshot(snapshot(1000, 100.0, 30.0)),
            SnapshotOutcome::Stale
        );
        assert_eq!(monitor.view().alert_state, ProximityAlertState::Armed);

        let mut other = snapshot(3000, 100.0, 30.0);
        other.bus_id = "bus-8".to_string();
        assert_eq!(monitor.apply_snapshot(other), SnapshotOutcome::OtherBus);
    }

    #[test]
    fn test_snapshot_without_rider_position() {
        let monitor = BusMonitor::new(
            MonitorConfig::new("bus-7", AlertRadius::OneKm),
            InstantOracle(0.0),
        );
        assert_eq!(
            monitor.apply_snapshot(snapshot(1, 100.0, 30.0)),
            SnapshotOutcome::Applied(None)
        );
        assert!(monitor.view().last_snapshot.is_some());
        assert_eq!(monitor.view().alert_state, ProximityAlertState::Armed);
    }

    #[test]
    fn test_acknowledge_and_reset() {
        let monitor = monitor(InstantOracle(0.0));
        assert!(!monitor.acknowledge_alert());

        monitor.apply_snapshot(snapshot(1, 500.0, 30.0));
        assert!(monitor.acknowledge_alert());
        assert_eq!(monitor.view().alert_state, ProximityAlertState::Suppressed);

        monitor.reset(AlertRadius::ThreeKm);
        assert_eq!(monitor.view().alert_state, ProximityAlertState::Armed);
    }

    #[tokio::test]
    async fn test_refresh_eta_publishes_display() {
        let monitor = monitor(InstantOracle(3000.0));
        assert_eq!(monitor.refresh_eta().await, None, "no snapshot yet");

        monitor.apply_snapshot(snapshot(1, 2500.0, 30.0));
        assert_eq!(monitor.refresh_eta().await, Some(EtaDisplay::Minutes(6)));
        assert_eq!(monitor.view().eta_text().as_deref(), Some("6 minutes"));
    }

    #[tokio::test]
    async fn test_late_eta_after_close_is_dropped() {
        let monitor = monitor(GatedOracle::new(3000.0));
        monitor.apply_snapshot(snapshot(1, 2500.0, 30.0));

        let (eta, _) = tokio::join!(monitor.refresh_eta(), async {
            settle().await;
            monitor.close();
            monitor.oracle.gate.notify_one();
        });

        assert_eq!(eta, None);
        assert_eq!(monitor.view().eta, None);
        assert_eq!(
            monitor.apply_snapshot(snapshot(2, 100.0, 30.0)),
            SnapshotOutcome::Closed
        );
    }

    #[tokio::test]
    async fn test_superseded_eta_is_dropped() {
        let monitor = monitor(GatedOracle::new(3000.0));
        monitor.apply_snapshot(snapshot(1, 2500.0, 30.0));

        let (first, second, _) = tokio::join!(monitor.refresh_eta(), monitor.refresh_eta(), async {
            settle().await;
            monitor.oracle.gate.notify_one();
            settle().await;
            monitor.oracle.gate.notify_one();
        });

        // Exactly one of the two results is kept: the newer request's
        let kept = [first, second].iter().filter(|eta| eta.is_some()).count();
        assert_eq!(kept, 1);
        assert_eq!(second, Some(EtaDisplay::Minutes(6)));
    }

    #[tokio::test]
    async fn test_run_applies_snapshots_while_eta_pending() {
        let feed = InProcessFeed::new();
        let monitor = monitor(GatedOracle::new(3000.0));

        tokio::join!(monitor.run(&feed), async {
            settle().await;
            assert_eq!(feed.subscriber_count(), 1);

            feed.publish(snapshot(1, 2500.0, 30.0));
            settle().await;
            assert_eq!(monitor.oracle.calls.get(), 1);

            // ETA still pending; proximity keeps updating
            feed.publish(snapshot(2, 800.0, 30.0));
            settle().await;
            assert_eq!(monitor.view().alert_state, ProximityAlertState::Triggered);
            assert_eq!(monitor.view().eta, None);
            assert_eq!(monitor.oracle.calls.get(), 1, "one request in flight at a time");

            monitor.oracle.gate.notify_one();
            settle().await;
            assert_eq!(monitor.view().eta, Some(EtaDisplay::Minutes(6)));
            assert_eq!(
                monitor.oracle.calls.get(),
                2,
                "snapshot applied during the request gets its own refresh"
            );

            monitor.close();
        });

        assert_eq!(feed.subscriber_count(), 0, "run unsubscribes on exit");
    }
}
