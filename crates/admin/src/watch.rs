//! Real-time change notifications.
//!
//! Repositories publish a [`ChangeEvent`] after every successful write and
//! subscribers receive them through an explicit, cancellable handle. This is
//! the push channel behind the SSE watch endpoints: a watch delivers the
//! current state of a collection first (queried by the route) and then every
//! subsequent change event.
//!
//! Cancellation is an explicit call ([`Subscription::cancel`] or
//! [`WatchHandle::cancel`]); dropping a handle detaches it as well. A lagging
//! subscriber loses the oldest undelivered events rather than blocking
//! writers.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Capacity of each per-collection broadcast channel.
const CHANNEL_CAPACITY: usize = 256;

/// The collections a subscriber can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Categories,
    Products,
    Clients,
    Orders,
    Drivers,
    Promotions,
    Notifications,
}

impl Collection {
    const ALL: [Self; 7] = [
        Self::Categories,
        Self::Products,
        Self::Clients,
        Self::Orders,
        Self::Drivers,
        Self::Promotions,
        Self::Notifications,
    ];
}

/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// One change to one record of a collection.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    /// Which collection changed.
    pub collection: Collection,
    /// What happened.
    pub kind: ChangeKind,
    /// ID of the affected record.
    pub id: i32,
    /// Serialized record after the change; `Null` for deletions.
    pub record: serde_json::Value,
}

/// Hub of per-collection broadcast channels.
///
/// Cheap to clone; all clones share the same channels.
#[derive(Clone)]
pub struct ChangeHub {
    senders: Arc<HashMap<Collection, broadcast::Sender<ChangeEvent>>>,
}

impl ChangeHub {
    /// Create a hub with one channel per collection.
    #[must_use]
    pub fn new() -> Self {
        let senders = Collection::ALL
            .into_iter()
            .map(|c| (c, broadcast::channel(CHANNEL_CAPACITY).0))
            .collect();
        Self {
            senders: Arc::new(senders),
        }
    }

    /// Publish a change event. A hub with no live subscribers drops the
    /// event silently.
    pub fn publish(&self, event: ChangeEvent) {
        if let Some(sender) = self.senders.get(&event.collection) {
            // send only fails when there are no receivers; that is fine.
            let _ = sender.send(event);
        }
    }

    /// Serialize a record and publish it as a change event.
    pub fn publish_record<T: Serialize>(
        &self,
        collection: Collection,
        kind: ChangeKind,
        id: i32,
        record: &T,
    ) {
        let record = serde_json::to_value(record).unwrap_or(serde_json::Value::Null);
        self.publish(ChangeEvent {
            collection,
            kind,
            id,
            record,
        });
    }

    /// Publish a deletion event.
    pub fn publish_deleted(&self, collection: Collection, id: i32) {
        self.publish(ChangeEvent {
            collection,
            kind: ChangeKind::Deleted,
            id,
            record: serde_json::Value::Null,
        });
    }

    /// Subscribe to one collection. Only events published after this call are
    /// delivered.
    #[must_use]
    pub fn subscribe(&self, collection: Collection) -> Subscription {
        let rx = self
            .senders
            .get(&collection)
            .map(broadcast::Sender::subscribe);
        Subscription { rx }
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to one collection's change events.
pub struct Subscription {
    rx: Option<broadcast::Receiver<ChangeEvent>>,
}

impl Subscription {
    /// Receive the next change event. Returns `None` once the subscription is
    /// cancelled or the hub is gone. Lagged events are skipped.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "watch subscriber lagged, skipping events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Detach from the channel. Subsequent `recv` calls return `None`.
    pub fn cancel(&mut self) {
        self.rx = None;
    }

    /// Spawn a task that invokes `callback` for every event until the handle
    /// is cancelled.
    pub fn forward<F>(mut self, mut callback: F) -> WatchHandle
    where
        F: FnMut(ChangeEvent) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            while let Some(event) = self.recv().await {
                callback(event);
            }
        });
        WatchHandle { task }
    }
}

/// Handle to a forwarding task; cancellation stops the callback.
pub struct WatchHandle {
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Stop forwarding. Idempotent.
    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i32) -> ChangeEvent {
        ChangeEvent {
            collection: Collection::Products,
            kind: ChangeKind::Created,
            id,
            record: serde_json::json!({ "id": id }),
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_later_events() {
        let hub = ChangeHub::new();
        let mut sub = hub.subscribe(Collection::Products);

        hub.publish(event(1));
        hub.publish(event(2));

        let first = sub.recv().await.expect("first event");
        let second = sub.recv().await.expect("second event");
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let hub = ChangeHub::new();
        let mut orders = hub.subscribe(Collection::Orders);

        hub.publish(event(7)); // products
        hub.publish(ChangeEvent {
            collection: Collection::Orders,
            kind: ChangeKind::Updated,
            id: 9,
            record: serde_json::Value::Null,
        });

        let received = orders.recv().await.expect("order event");
        assert_eq!(received.id, 9);
        assert_eq!(received.collection, Collection::Orders);
    }

    #[tokio::test]
    async fn test_cancelled_subscription_receives_nothing() {
        let hub = ChangeHub::new();
        let mut sub = hub.subscribe(Collection::Products);
        sub.cancel();

        hub.publish(event(1));
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_forward_invokes_callback_until_cancelled() {
        let hub = ChangeHub::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let handle = hub.subscribe(Collection::Products).forward(move |event| {
            let _ = tx.send(event.id);
        });

        hub.publish(event(5));
        let seen = rx.recv().await.expect("forwarded event");
        assert_eq!(seen, 5);

        handle.cancel();
        // The callback channel closes once the forwarding task is aborted.
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let hub = ChangeHub::new();
        hub.publish(event(1));
    }
}
