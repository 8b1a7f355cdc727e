pub mod assets;
pub mod emit;
pub mod health;

use axum::Router;
use utoipa::OpenApi;

use crate::config::Config;
use crate::AppState;

pub fn router(config: &Config) -> Router<AppState> {
    Router::new()
        .merge(assets::router(&config.static_dir))
        .merge(health::router())
        .merge(emit::router())
        .merge(crate::relay::server::router())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Relay
        emit::emit,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            // Payloads
            crate::relay::events::RelayEvent,
            // Route request/response types
            health::HealthResponse,
            emit::EmitResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Relay", description = "Event publishing"),
    )
)]
pub struct ApiDoc;
