//! Per-connection stream session state.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::Event;
use futures_util::stream::{self, Stream};
use tokio::sync::watch;

use super::events::QueueItem;
use super::heartbeat::Heartbeat;
use super::queue::QueueReceiver;
use super::registry::SubscriberRegistry;

/// Lifecycle of a stream session. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Streaming,
    Closed,
}

/// One subscriber: its queue, its heartbeat and its registry membership.
///
/// Teardown runs from `Drop`, so every exit path (client disconnect, write
/// error, server shutdown, panic unwinding) cancels the heartbeat and
/// deregisters the queue before the receiver is released.
pub struct StreamSession {
    subscriber_id: String,
    registry: Arc<SubscriberRegistry>,
    heartbeat: Option<Heartbeat>,
    state: SessionState,
    closing: watch::Receiver<bool>,
    rx: QueueReceiver,
}

impl StreamSession {
    /// Register a fresh queue, start its heartbeat and begin streaming.
    pub fn start(registry: Arc<SubscriberRegistry>, heartbeat_every: Duration) -> Self {
        let closing = registry.closing();
        let (queue, rx) = registry.register();
        let subscriber_id = queue.id().to_string();

        let mut session = Self {
            subscriber_id,
            registry,
            heartbeat: None,
            state: SessionState::Starting,
            closing,
            rx,
        };

        session.heartbeat = Some(Heartbeat::spawn(queue, heartbeat_every));
        session.state = SessionState::Streaming;

        tracing::info!(
            subscriber_id = %session.subscriber_id,
            total = session.registry.len(),
            "new subscriber"
        );

        session
    }

    pub fn subscriber_id(&self) -> &str {
        &self.subscriber_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Wait for the next queued item.
    ///
    /// Returns `None` once the session is closed, including when the registry
    /// signals server shutdown.
    pub async fn next_item(&mut self) -> Option<QueueItem> {
        if self.state == SessionState::Closed {
            return None;
        }

        let item = tokio::select! {
            biased;
            _ = shutdown_signalled(&mut self.closing) => None,
            item = self.rx.recv() => item,
        };

        if item.is_none() {
            self.close();
        }
        item
    }

    /// Cancel the heartbeat, then deregister. Safe to call more than once.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;

        if let Some(heartbeat) = self.heartbeat.take() {
            heartbeat.cancel();
        }
        self.registry.deregister(&self.subscriber_id);

        tracing::info!(
            subscriber_id = %self.subscriber_id,
            total = self.registry.len(),
            "subscriber removed"
        );
    }

    /// Turn the session into an SSE body. Dropping the stream closes the
    /// session.
    pub fn into_sse_stream(self) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
        stream::unfold(self, |mut session| async move {
            loop {
                let item = session.next_item().await?;
                match item.to_sse() {
                    Ok(event) => return Some((Ok(event), session)),
                    Err(err) => {
                        tracing::warn!(?err, subscriber_id = %session.subscriber_id, "failed to encode event");
                    }
                }
            }
        })
    }
}

/// Resolves once the registry is closed (or dropped).
async fn shutdown_signalled(closing: &mut watch::Receiver<bool>) {
    loop {
        let closed = *closing.borrow_and_update();
        if closed || closing.changed().await.is_err() {
            return;
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close();
    }
}
