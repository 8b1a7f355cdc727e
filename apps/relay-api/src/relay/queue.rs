//! Bounded per-subscriber event queues.

use tokio::sync::mpsc::{self, error::TrySendError};

use super::events::QueueItem;

/// Result of a non-blocking push into a subscriber queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    Queued,
    /// The queue was at capacity; the item was discarded for this subscriber.
    Full,
    /// The consuming session is gone.
    Closed,
}

/// Producer side of one subscriber's queue.
///
/// Cheap to clone; the registry, the fan-out pass and the heartbeat each hold
/// one. The consumer side is owned by the stream session.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    id: String,
    tx: mpsc::Sender<QueueItem>,
}

/// Consumer side of a subscriber queue.
pub type QueueReceiver = mpsc::Receiver<QueueItem>;

impl QueueHandle {
    /// Allocate a queue holding at most `capacity` pending items.
    pub fn bounded(id: String, capacity: usize) -> (Self, QueueReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Push without waiting. A full queue drops the new item (drop-newest);
    /// items already queued are never displaced.
    pub fn enqueue(&self, item: QueueItem) -> Enqueue {
        match self.tx.try_send(item) {
            Ok(()) => Enqueue::Queued,
            Err(TrySendError::Full(_)) => Enqueue::Full,
            Err(TrySendError::Closed(_)) => Enqueue::Closed,
        }
    }
}
