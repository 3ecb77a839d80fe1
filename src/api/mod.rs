// src/api/mod.rs

pub mod chat;
pub mod streaming;

use std::sync::Arc;

use axum::http::{header, HeaderName};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Permissive CORS for the browser UI. Applied to every response, errors
/// included; preflight `OPTIONS` requests are answered by the layer itself.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-device-id"),
        ])
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(streaming::chat))
        .route(
            "/api/conversations",
            post(chat::create_conversation).get(chat::list_conversations),
        )
        .route(
            "/api/conversations/{id}",
            patch(chat::rename_conversation).delete(chat::delete_conversation),
        )
        .route(
            "/api/conversations/{id}/messages",
            get(chat::list_messages).post(chat::append_message),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "aura" }))
}
