//! Relay event payloads, queue items, and their text-event-stream rendering.

use std::sync::Arc;

use axum::response::sse::Event;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Field stamped onto events that arrive without one.
pub const TIMESTAMP_FIELD: &str = "ts";

/// Comment text sent on every heartbeat tick (`: keepalive`).
pub const KEEPALIVE_COMMENT: &str = "keepalive";

/// Longest `msg` preview written to the emit log line.
const MSG_PREVIEW_CHARS: usize = 120;

/// An arbitrary JSON object published through `/emit`.
///
/// Key order is preserved as received so the payload round-trips unchanged.
/// Deserializing anything other than a JSON object fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct RelayEvent(Map<String, Value>);

impl RelayEvent {
    /// Wrap a JSON value. Returns `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Add a UTC `ts` field unless the publisher supplied one.
    ///
    /// Returns `true` if the event was stamped.
    pub fn stamp_timestamp(&mut self) -> bool {
        if self.0.contains_key(TIMESTAMP_FIELD) {
            return false;
        }
        self.0.insert(
            TIMESTAMP_FIELD.to_string(),
            Value::String(relay_common::utc_timestamp()),
        );
        true
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Short, log-friendly rendering of the `msg` field (empty if absent).
    pub fn msg_preview(&self) -> String {
        let full = match self.0.get("msg") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        full.chars().take(MSG_PREVIEW_CHARS).collect()
    }
}

/// One entry in a subscriber queue.
#[derive(Debug, Clone)]
pub enum QueueItem {
    /// A published event, shared between every queue it was fanned out to.
    Event(Arc<RelayEvent>),
    /// Heartbeat marker; rendered as a comment, never as data.
    Keepalive,
}

impl QueueItem {
    /// Render this item as a single SSE frame.
    ///
    /// Events become `data: <compact json>`, keepalives become `: keepalive`.
    pub fn to_sse(&self) -> Result<Event, axum::Error> {
        match self {
            QueueItem::Keepalive => Ok(Event::default().comment(KEEPALIVE_COMMENT)),
            QueueItem::Event(event) => Event::default().json_data(event.as_ref()),
        }
    }

    pub fn is_keepalive(&self) -> bool {
        matches!(self, QueueItem::Keepalive)
    }
}
