//! Per-subscriber keepalive ticker.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::events::QueueItem;
use super::queue::{Enqueue, QueueHandle};

/// Background task that pushes a keepalive marker into one subscriber's queue
/// on a fixed interval. The first marker is queued immediately.
///
/// The task reaches the queue only through a shared slot. [`cancel`](Self::cancel)
/// empties the slot under its lock, so once it returns no tick can push again,
/// even one already running on another worker.
pub struct Heartbeat {
    slot: Arc<Mutex<Option<QueueHandle>>>,
    task: JoinHandle<()>,
}

impl Heartbeat {
    pub fn spawn(queue: QueueHandle, every: Duration) -> Self {
        let subscriber_id = queue.id().to_string();
        let slot = Arc::new(Mutex::new(Some(queue)));
        let task_slot = slot.clone();

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let outcome = {
                    let slot = task_slot.lock();
                    match slot.as_ref() {
                        Some(queue) => queue.enqueue(QueueItem::Keepalive),
                        None => break,
                    }
                };
                match outcome {
                    Enqueue::Queued => {}
                    // Never displace real events; try again next tick.
                    Enqueue::Full => {
                        tracing::debug!(%subscriber_id, "queue full, skipping keepalive");
                    }
                    Enqueue::Closed => break,
                }
            }
        });

        Self { slot, task }
    }

    /// Stop ticking. Waits for an in-flight push, then releases the queue.
    pub fn cancel(&self) {
        self.slot.lock().take();
        self.task.abort();
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.cancel();
    }
}
