// src/types/openai.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body sent to the upstream gateway's chat-completions endpoint.
#[derive(Serialize)]
pub struct GatewayRequest {
    pub model: String,
    pub messages: Vec<Value>, // Using Value so caller-supplied messages pass through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    pub stream: bool,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: OpenAIContent,
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum OpenAIContent {
    Text(String),
    Parts(Vec<OpenAIContentPart>),
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum OpenAIContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrlData },
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ImageUrlData {
    pub url: String,
}

/// One streamed completion chunk, as carried by a `data:` line.
#[derive(Deserialize, Debug)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Deserialize, Debug)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: StreamDelta,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct StreamDelta {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCallChunk>>,
}

/// Tool-call fragment inside a delta. Only the first fragment of a call
/// carries `id` (and usually the function name); continuations carry bare
/// argument text.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ToolCallChunk {
    pub index: Option<u32>,
    pub id: Option<String>,
    pub function: Option<FunctionChunk>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct FunctionChunk {
    pub name: Option<String>,
    pub arguments: Option<String>,
}
