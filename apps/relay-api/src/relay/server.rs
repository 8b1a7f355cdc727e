//! `GET /logs`: one text-event-stream session per connection.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::routing::get;
use axum::Router;
use futures_util::stream::Stream;

use crate::AppState;

use super::session::StreamSession;

pub fn router() -> Router<AppState> {
    Router::new().route("/logs", get(stream_logs))
}

/// The session is registered before the response is returned, so events
/// emitted after the client sees the response headers are never missed.
async fn stream_logs(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let session = StreamSession::start(state.registry.clone(), state.config.heartbeat_interval);
    Sse::new(session.into_sse_stream())
}
