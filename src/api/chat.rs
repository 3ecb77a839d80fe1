// src/api/chat.rs

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::db;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{
    AppendMessageRequest, ChatMessageRow, ConversationSummary, CreatedConversation,
    CreatedMessage, RenameConversationRequest,
};

/// The opaque device identifier scoping all conversation access. The client
/// generates it once and sends it on every request.
fn device_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get("x-device-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing x-device-id header".to_string()))
}

/// Resolve `conversation_id` for this device or fail with 404. Another
/// device's conversation looks exactly like a missing one.
fn check_owned(
    conn: &rusqlite::Connection,
    device: &str,
    conversation_id: &str,
) -> Result<(), ApiError> {
    if db::owns_conversation(conn, device, conversation_id)? {
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}

pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CreatedConversation>, ApiError> {
    let device = device_id(&headers)?;
    let conn = db::open_db(&state.db_path)?;
    let id = db::create_conversation(&conn, &device)?;
    Ok(Json(CreatedConversation { id }))
}

pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let device = device_id(&headers)?;
    let conn = db::open_db(&state.db_path)?;
    Ok(Json(db::list_conversations(&conn, &device)?))
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<ChatMessageRow>>, ApiError> {
    let device = device_id(&headers)?;
    let conn = db::open_db(&state.db_path)?;
    check_owned(&conn, &device, &conversation_id)?;
    Ok(Json(db::list_messages(&conn, &conversation_id)?))
}

pub async fn append_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
    Json(req): Json<AppendMessageRequest>,
) -> Result<Json<CreatedMessage>, ApiError> {
    if req.role != "user" && req.role != "assistant" {
        return Err(ApiError::BadRequest(
            "role must be 'user' or 'assistant'".to_string(),
        ));
    }

    let device = device_id(&headers)?;
    let conn = db::open_db(&state.db_path)?;
    check_owned(&conn, &device, &conversation_id)?;

    let id = db::insert_message(
        &conn,
        &conversation_id,
        &req.role,
        &req.content,
        req.chart.as_ref(),
    )?;
    Ok(Json(CreatedMessage { id }))
}

pub async fn rename_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
    Json(req): Json<RenameConversationRequest>,
) -> Result<StatusCode, ApiError> {
    let device = device_id(&headers)?;
    let conn = db::open_db(&state.db_path)?;
    check_owned(&conn, &device, &conversation_id)?;
    db::rename_conversation(&conn, &conversation_id, &req.title)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let device = device_id(&headers)?;
    let conn = db::open_db(&state.db_path)?;
    check_owned(&conn, &device, &conversation_id)?;
    db::delete_conversation(&conn, &conversation_id)?;
    Ok(StatusCode::NO_CONTENT)
}
