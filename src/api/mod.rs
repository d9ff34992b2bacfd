pub mod assays;
pub mod chat;
pub mod gaps;

use axum::routing::{get, post};
use axum::{Json, Router};

use crate::models::HealthResponse;
use crate::state::AppState;

/// Every route of the service, with state attached. Layers are added by the
/// caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/gaps/search", get(gaps::search_gaps))
        .route("/gaps/coverage", get(gaps::gap_coverage))
        .route("/gaps/options", get(gaps::gap_options))
        .route("/assays/search", get(assays::search_assays))
        // The web client opens chats with GET.
        .route("/api/v1/chats", get(chat::create_chat).post(chat::create_chat))
        .route(
            "/api/v1/chats/{id}",
            get(chat::get_chat).delete(chat::delete_chat),
        )
        .route("/api/v1/chats/{id}/messages", post(chat::post_message))
        .with_state(state)
}

/// GET /: liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
