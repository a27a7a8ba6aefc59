//! Subscriber bus
//!
//! Fans session snapshots out to any number of observers. Synchronous
//! listeners run inline on every publish; async consumers use the
//! [`watch`](SubscriberBus::watch) channel, which always holds the latest
//! snapshot.

use crate::snapshot::SessionSnapshot;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tokio::sync::watch;
use tracing::trace;

type Listener = Arc<dyn Fn(&SessionSnapshot) + Send + Sync>;

/// Registry of snapshot listeners
pub struct SubscriberBus {
    listeners: RwLock<HashMap<u64, Listener>>,
    next_id: AtomicU64,
    latest: watch::Sender<Arc<SessionSnapshot>>,
}

impl SubscriberBus {
    pub fn new(initial: SessionSnapshot) -> Self {
        let (latest, _) = watch::channel(Arc::new(initial));
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            latest,
        }
    }

    /// Register a listener
    ///
    /// The listener stays registered for as long as the returned
    /// [`Subscription`] lives.
    pub fn subscribe<F>(self: &Arc<Self>, listener: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(listener));

        trace!(id, "Listener subscribed");
        Subscription {
            bus: Arc::downgrade(self),
            id,
        }
    }

    fn unsubscribe(&self, id: u64) {
        let removed = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_some() {
            trace!(id, "Listener unsubscribed");
        }
    }

    /// Hand `snapshot` to every listener, then make it the latest
    ///
    /// Listeners are called outside the registry lock, so they may
    /// subscribe or unsubscribe while being notified.
    pub fn publish(&self, snapshot: SessionSnapshot) {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for listener in &listeners {
            listener(&snapshot);
        }

        self.latest.send_replace(Arc::new(snapshot));
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.latest.borrow().clone()
    }

    /// Receiver that always holds the latest snapshot
    pub fn watch(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.latest.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for SubscriberBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberBus")
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

/// Scoped listener registration
///
/// Dropping it removes the listener.
#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<SubscriberBus>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlaybackStatus;
    use std::sync::Mutex;

    fn snapshot(status: PlaybackStatus) -> SessionSnapshot {
        SessionSnapshot {
            status,
            ..SessionSnapshot::default()
        }
    }

    #[test]
    fn listeners_receive_every_publish() {
        let bus = Arc::new(SubscriberBus::new(SessionSnapshot::default()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let _sub = bus.subscribe(move |s| sink.lock().unwrap().push(s.status));

        bus.publish(snapshot(PlaybackStatus::Loading));
        bus.publish(snapshot(PlaybackStatus::Playing));

        assert_eq!(
            *seen.lock().unwrap(),
            [PlaybackStatus::Loading, PlaybackStatus::Playing]
        );
        assert_eq!(bus.snapshot().status, PlaybackStatus::Playing);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let bus = Arc::new(SubscriberBus::new(SessionSnapshot::default()));
        let count = Arc::new(AtomicU64::new(0));

        let counter = count.clone();
        let sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(bus.listener_count(), 1);

        bus.publish(SessionSnapshot::default());
        drop(sub);
        bus.publish(SessionSnapshot::default());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn explicit_unsubscribe() {
        let bus = Arc::new(SubscriberBus::new(SessionSnapshot::default()));
        let sub = bus.subscribe(|_| {});
        let other = bus.subscribe(|_| {});

        sub.unsubscribe();
        assert_eq!(bus.listener_count(), 1);
        drop(other);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_bus_is_harmless() {
        let bus = Arc::new(SubscriberBus::new(SessionSnapshot::default()));
        let sub = bus.subscribe(|_| {});
        drop(bus);
        drop(sub);
    }

    #[test]
    fn watch_sees_latest() {
        let bus = Arc::new(SubscriberBus::new(SessionSnapshot::default()));
        let mut rx = bus.watch();

        bus.publish(snapshot(PlaybackStatus::Paused));

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status, PlaybackStatus::Paused);
    }

    #[test]
    fn listener_may_subscribe_during_publish() {
        let bus = Arc::new(SubscriberBus::new(SessionSnapshot::default()));
        let extra = Arc::new(Mutex::new(Vec::new()));

        let inner_bus = bus.clone();
        let holder = extra.clone();
        let _sub = bus.subscribe(move |_| {
            holder.lock().unwrap().push(inner_bus.subscribe(|_| {}));
        });

        bus.publish(SessionSnapshot::default());
        assert_eq!(bus.listener_count(), 2);
    }
}
