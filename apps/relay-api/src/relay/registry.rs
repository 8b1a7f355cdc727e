//! Registry of live subscriber queues.

use dashmap::DashMap;
use relay_common::id::{prefix, prefixed_ulid};
use tokio::sync::watch;

use super::queue::{QueueHandle, QueueReceiver};

/// Shared set of all subscriber queues that a session is currently draining.
///
/// Membership is the only semantics: the dispatcher snapshots it, sessions
/// insert on start and remove on teardown. `DashMap` keeps add/remove/iterate
/// individually atomic without a global lock.
pub struct SubscriberRegistry {
    queues: DashMap<String, QueueHandle>,
    capacity: usize,
    closing: watch::Sender<bool>,
}

impl SubscriberRegistry {
    pub fn new(capacity: usize) -> Self {
        let (closing, _) = watch::channel(false);
        Self {
            queues: DashMap::new(),
            capacity: capacity.max(1),
            closing,
        }
    }

    /// Allocate a bounded queue for a new subscriber and make it visible to
    /// broadcasts. The receiver belongs to the caller.
    pub fn register(&self) -> (QueueHandle, QueueReceiver) {
        let (handle, rx) = QueueHandle::bounded(prefixed_ulid(prefix::SUBSCRIBER), self.capacity);
        self.queues.insert(handle.id().to_string(), handle.clone());
        (handle, rx)
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn deregister(&self, subscriber_id: &str) -> bool {
        self.queues.remove(subscriber_id).is_some()
    }

    /// Point-in-time copy of the current membership.
    pub fn snapshot(&self) -> Vec<QueueHandle> {
        self.queues.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn contains(&self, subscriber_id: &str) -> bool {
        self.queues.contains_key(subscriber_id)
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Signal every session to finish its stream (server shutdown).
    pub fn close(&self) {
        self.closing.send_replace(true);
    }

    /// Receiver that flips to `true` once [`close`](Self::close) is called.
    pub fn closing(&self) -> watch::Receiver<bool> {
        self.closing.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::events::QueueItem;
    use crate::relay::queue::Enqueue;

    #[test]
    fn register_then_deregister_restores_size() {
        let registry = SubscriberRegistry::new(4);
        let (_existing, _rx0) = registry.register();
        let before = registry.len();

        let (handle, _rx) = registry.register();
        assert_eq!(registry.len(), before + 1);
        assert!(registry.contains(handle.id()));
        assert!(handle.id().starts_with("sub_"));

        assert!(registry.deregister(handle.id()));
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn deregister_is_idempotent() {
        let registry = SubscriberRegistry::new(4);
        let (handle, _rx) = registry.register();
        assert!(registry.deregister(handle.id()));
        assert!(!registry.deregister(handle.id()));
        assert!(!registry.deregister("sub_unknown"));
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_later_changes() {
        let registry = SubscriberRegistry::new(4);
        let (a, _rx_a) = registry.register();
        let snapshot = registry.snapshot();

        let (_b, _rx_b) = registry.register();
        registry.deregister(a.id());

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), a.id());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn queues_use_configured_capacity() {
        let registry = SubscriberRegistry::new(2);
        let (handle, _rx) = registry.register();
        assert_eq!(handle.enqueue(QueueItem::Keepalive), Enqueue::Queued);
        assert_eq!(handle.enqueue(QueueItem::Keepalive), Enqueue::Queued);
        assert_eq!(handle.enqueue(QueueItem::Keepalive), Enqueue::Full);
    }

    #[test]
    fn close_flips_watch() {
        let registry = SubscriberRegistry::new(1);
        let closing = registry.closing();
        assert!(!*closing.borrow());
        registry.close();
        assert!(*closing.borrow());
        // Late subscribers see the closed state immediately.
        assert!(*registry.closing().borrow());
    }
}
