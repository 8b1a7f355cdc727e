//! Broadcast hub fanning published events out to every subscriber queue.
//!
//! Each subscriber owns a bounded queue, so a slow reader only ever loses its
//! own events. Publishers never wait on subscribers.

use std::sync::Arc;

use super::events::{QueueItem, RelayEvent};
use super::queue::Enqueue;
use super::registry::SubscriberRegistry;

/// Outcome of one fan-out pass, for logging only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutStats {
    pub delivered: usize,
    pub dropped: usize,
}

/// The broadcast dispatcher. Cloneable; store in AppState.
#[derive(Clone)]
pub struct RelayBroadcast {
    registry: Arc<SubscriberRegistry>,
}

impl RelayBroadcast {
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self { registry }
    }

    /// Push `event` into every registered queue without blocking.
    ///
    /// Membership is snapshotted first, so subscribers joining mid-pass do not
    /// receive this event and ones leaving mid-pass are skipped once their
    /// queue has closed.
    pub fn dispatch(&self, event: RelayEvent) -> FanoutStats {
        let event = Arc::new(event);
        let mut stats = FanoutStats::default();

        for queue in self.registry.snapshot() {
            match queue.enqueue(QueueItem::Event(event.clone())) {
                Enqueue::Queued => stats.delivered += 1,
                Enqueue::Full => {
                    stats.dropped += 1;
                    tracing::debug!(subscriber_id = %queue.id(), "dropping message for slow client");
                }
                Enqueue::Closed => {}
            }
        }

        stats
    }
}
