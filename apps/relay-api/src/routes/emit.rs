use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiErrorBody};
use crate::relay::events::RelayEvent;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/emit", post(emit))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmitResponse {
    pub ok: bool,
}

/// Publish one event to every connected stream.
///
/// A `ts` field is added when missing. The response does not depend on how
/// many subscribers (if any) accepted the event.
#[utoipa::path(
    post,
    path = "/emit",
    tag = "Relay",
    request_body = RelayEvent,
    responses(
        (status = 200, description = "Event dispatched", body = EmitResponse),
        (status = 400, description = "Body is not a JSON object", body = ApiErrorBody),
    ),
)]
pub async fn emit(
    State(state): State<AppState>,
    payload: Result<Json<RelayEvent>, JsonRejection>,
) -> Result<Json<EmitResponse>, ApiError> {
    let Json(mut event) = payload?;
    event.stamp_timestamp();

    let preview = event.msg_preview();
    let stats = state.broadcast.dispatch(event);

    tracing::info!(
        msg = %preview,
        delivered = stats.delivered,
        dropped = stats.dropped,
        "emitted"
    );

    Ok(Json(EmitResponse { ok: true }))
}
