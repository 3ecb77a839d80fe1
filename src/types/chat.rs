// src/types/chat.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::chart::ChartSpec;

/// One message in a conversation as the client holds it in memory. The last
/// assistant message is the one progressively grown while a response streams
/// in.
#[derive(Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            chart: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            chart: None,
        }
    }
}

/// The fully assembled result of one streamed exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct AssistantResponse {
    pub content: String,
    pub chart: Option<ChartSpec>,
}

/// Body of `POST /api/chat`. Messages pass through to the gateway untouched,
/// so they stay opaque JSON here.
#[derive(Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Value>,
}

#[derive(Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub updated_at: i64,
    pub preview: String,
}

#[derive(Serialize, Deserialize)]
pub struct ChatMessageRow {
    pub id: String,
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
    pub created_at: i64,
}

#[derive(Serialize, Deserialize)]
pub struct CreatedConversation {
    pub id: String,
}

#[derive(Serialize, Deserialize)]
pub struct CreatedMessage {
    pub id: String,
}

#[derive(Deserialize, Serialize)]
pub struct AppendMessageRequest {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
}

#[derive(Deserialize, Serialize)]
pub struct RenameConversationRequest {
    pub title: String,
}
