//! Push subscription interface for the location/status stream.
//!
//! The engine depends only on [`LocationFeed`]. A real store client, a file
//! replay and the test fakes all sit behind the same interface.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use super::snapshot::BusSnapshot;
use super::FeedError;

/// Callback for each delivered snapshot.
pub type UpdateCallback = Box<dyn FnMut(BusSnapshot) + Send>;

/// Callback for stream errors.
pub type ErrorCallback = Box<dyn FnMut(FeedError) + Send>;

/// A push source of bus snapshots.
pub trait LocationFeed {
    /// Registers callbacks and returns a handle that unsubscribes on drop.
    fn subscribe(&self, on_update: UpdateCallback, on_error: ErrorCallback) -> Subscription;
}

/// Unsubscribe handle returned by [`LocationFeed::subscribe`].
///
/// Dropping the handle unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Creates a handle that runs `cancel` once when unsubscribed.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unsubscribes now.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Event form of the two callbacks, for consumers that prefer a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A snapshot was delivered.
    Update(BusSnapshot),
    /// The stream reported an error.
    Error(FeedError),
}

/// Subscribes to `feed` and forwards both callbacks into an unbounded channel.
pub fn subscribe_channel<F: LocationFeed + ?Sized>(
    feed: &F,
) -> (Subscription, mpsc::UnboundedReceiver<FeedEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let error_tx = tx.clone();
    let subscription = feed.subscribe(
        Box::new(move |snapshot| {
            let bus_id = snapshot.bus_id.clone();
            if tx.send(FeedEvent::Update(snapshot)).is_err() {
                debug!(bus_id = %bus_id, "Feed receiver dropped, snapshot discarded");
            }
        }),
        Box::new(move |error| {
            if error_tx.send(FeedEvent::Error(error)).is_err() {
                debug!("Feed receiver dropped, error discarded");
            }
        }),
    );
    (subscription, rx)
}

struct Subscriber {
    id: u64,
    on_update: UpdateCallback,
    on_error: ErrorCallback,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// In-process push source.
///
/// Hosts bridge a real store client into it, the CLI replays recorded
/// records through it, and tests use it as a deterministic fake producer.
/// Callbacks run synchronously inside [`publish`](Self::publish) and must not
/// publish back into the same feed.
#[derive(Clone, Default)]
pub struct InProcessFeed {
    registry: Arc<Mutex<Registry>>,
}

impl InProcessFeed {
    /// Creates a feed with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a snapshot to every subscriber.
    pub fn publish(&self, snapshot: BusSnapshot) {
        let mut registry = self.registry.lock();
        for subscriber in registry.subscribers.iter_mut() {
            (subscriber.on_update)(snapshot.clone());
        }
    }

    /// Delivers an error to every subscriber.
    pub fn fail(&self, error: FeedError) {
        let mut registry = self.registry.lock();
        for subscriber in registry.subscribers.iter_mut() {
            (subscriber.on_error)(error.clone());
        }
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().subscribers.len()
    }
}

impl LocationFeed for InProcessFeed {
    fn subscribe(&self, on_update: UpdateCallback, on_error: ErrorCallback) -> Subscription {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.subscribers.push(Subscriber {
                id,
                on_update,
                on_error,
            });
            id
        };

        let registry: Weak<Mutex<Registry>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().subscribers.retain(|s| s.id != id);
            }
        })
    }
}

impl std::fmt::Debug for InProcessFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessFeed")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
