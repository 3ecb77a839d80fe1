// src/api/streaming.rs

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;
use crate::tools::{get_all_tools, tools_to_openai_format};
use crate::types::{ChatRequest, GatewayRequest};

/// `POST /api/chat`: forward the caller's messages to the AI gateway and
/// stream the SSE response body back verbatim.
///
/// The handler injects the AURA system instruction ahead of the caller's
/// messages, attaches the `create_chart` tool, and always requests a
/// streamed completion. Upstream quota failures keep their status codes;
/// every other upstream failure collapses to the generic gateway error.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let api_key = state
        .api_key
        .as_deref()
        .ok_or_else(|| ApiError::Internal("AURA_API_KEY is not configured".to_string()))?;

    tracing::info!(messages = req.messages.len(), "chat request received");

    let mut messages = Vec::with_capacity(req.messages.len() + 1);
    messages.push(json!({
        "role": "system",
        "content": state.settings.defaults.system_prompt,
    }));
    messages.extend(req.messages);

    let body = GatewayRequest {
        model: state.settings.gateway.model.clone(),
        messages,
        tools: Some(tools_to_openai_format(&get_all_tools())),
        stream: true,
    };

    let upstream = state
        .http
        .post(&state.settings.gateway.url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;

    let status = upstream.status();
    if !status.is_success() {
        return Err(match status.as_u16() {
            429 => ApiError::RateLimited,
            402 => ApiError::PaymentRequired,
            _ => {
                let detail = upstream.text().await.unwrap_or_default();
                tracing::error!(status = %status, %detail, "AI gateway error");
                ApiError::Gateway
            }
        });
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    Ok(response)
}
