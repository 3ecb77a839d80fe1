// src/client.rs

use std::collections::VecDeque;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde_json::json;

use crate::error::ChatError;
use crate::settings::DeviceId;
use crate::stream::{ResponseAssembler, StreamDecoder, StreamEvent};
use crate::types::{
    AssistantResponse, ChatMessage, ImageUrlData, OpenAIContent, OpenAIContentPart,
    OpenAIMessage,
};

/// Only the most recent turns ride along on each request.
const HISTORY_WINDOW: usize = 20;

/// Talks to the backend chat endpoint and decodes the streamed reply.
///
/// One `send` call corresponds to one decoder instance; concurrent requests
/// (a new message while a stream is still arriving, or a regenerate) each
/// get their own [`ChatStream`] with independent state. Dropping the stream
/// cancels the request.
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    device_id: DeviceId,
}

impl ChatClient {
    pub fn new(endpoint: impl Into<String>, device_id: DeviceId) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            device_id,
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// POST the message history and open the event stream.
    ///
    /// Transport failures and the backend's mapped quota errors surface here
    /// as typed variants, before any decoding happens; the decoder only ever
    /// sees a 200 body.
    pub async fn send(&self, messages: &[OpenAIMessage]) -> Result<ChatStream, ChatError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-device-id", self.device_id.as_str())
            .json(&json!({ "messages": messages }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v["error"].as_str().map(str::to_string))
                .unwrap_or_else(|| "chat request failed".to_string());

            return Err(match status.as_u16() {
                429 => ChatError::RateLimited,
                402 => ChatError::PaymentRequired,
                code => ChatError::Endpoint {
                    status: code,
                    message,
                },
            });
        }

        Ok(ChatStream::new(response.bytes_stream().boxed()))
    }
}

/// The read loop over one streamed response: pull a chunk, feed the decoder,
/// hand out events in order. Reading stops at `StreamEnd` or when the body
/// is exhausted, whichever comes first.
pub struct ChatStream {
    bytes: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: StreamDecoder,
    pending: VecDeque<StreamEvent>,
    source_done: bool,
    ended: bool,
}

impl ChatStream {
    fn new(bytes: BoxStream<'static, reqwest::Result<Bytes>>) -> Self {
        Self {
            bytes,
            decoder: StreamDecoder::new(),
            pending: VecDeque::new(),
            source_done: false,
            ended: false,
        }
    }

    /// The next decoded event, or `None` once the stream has ended.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                if matches!(event, StreamEvent::StreamEnd) {
                    self.ended = true;
                }
                return Some(event);
            }
            if self.ended || self.source_done {
                return None;
            }

            match self.bytes.next().await {
                Some(Ok(chunk)) => self.pending.extend(self.decoder.feed(&chunk)),
                Some(Err(err)) => {
                    // Connection dropped mid-stream: deliver what decoded so
                    // far and terminate.
                    tracing::warn!(%err, "response body read failed mid-stream");
                    self.pending.extend(self.decoder.finish());
                    self.source_done = true;
                }
                None => {
                    self.pending.extend(self.decoder.finish());
                    self.source_done = true;
                }
            }
        }
    }

    /// Drive the read loop to completion and assemble the final message.
    pub async fn collect_response(mut self) -> AssistantResponse {
        let mut assembler = ResponseAssembler::new();
        while let Some(event) = self.next_event().await {
            assembler.push(&event);
        }
        assembler.finish()
    }
}

/// Encode raw image bytes for embedding in an `image_url` content part.
pub fn encode_image(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// A user message carrying text plus zero or more base64 JPEG images.
pub fn user_message_with_images(text: &str, images_base64: &[String]) -> OpenAIMessage {
    if images_base64.is_empty() {
        return OpenAIMessage {
            role: "user".to_string(),
            content: OpenAIContent::Text(text.to_string()),
        };
    }

    let mut parts = vec![OpenAIContentPart::Text {
        text: text.to_string(),
    }];
    for img_base64 in images_base64 {
        parts.push(OpenAIContentPart::ImageUrl {
            image_url: ImageUrlData {
                url: format!("data:image/jpeg;base64,{}", img_base64),
            },
        });
    }

    OpenAIMessage {
        role: "user".to_string(),
        content: OpenAIContent::Parts(parts),
    }
}

/// Recent conversation history in the request wire shape.
pub fn history_to_wire(history: &[ChatMessage]) -> Vec<OpenAIMessage> {
    let recent = if history.len() > HISTORY_WINDOW {
        &history[history.len() - HISTORY_WINDOW..]
    } else {
        history
    };

    recent
        .iter()
        .map(|msg| OpenAIMessage {
            role: msg.role.clone(),
            content: OpenAIContent::Text(msg.content.clone()),
        })
        .collect()
}
