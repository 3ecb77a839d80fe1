// src/stream.rs
//
// Incremental decoder for the SSE stream produced by the AI gateway.
//
// The gateway frames its response as `data: `-prefixed lines carrying
// OpenAI-style chat completion chunks, terminated by a `data: [DONE]`
// sentinel:
//
// ```text
// data: {"choices":[{"delta":{"content":"Hel"}}]}
// data: {"choices":[{"delta":{"content":"lo"}}]}
// data: [DONE]
// ```
//
// The decoder is a pure byte-to-event transducer: it performs no I/O and
// never errors. Bytes are buffered until a full `\n`-terminated line exists,
// so chunk boundaries (including ones splitting a multi-byte UTF-8 sequence)
// never affect the emitted event sequence.

use crate::tools::CHART_TOOL_NAME;
use crate::types::{AssistantResponse, ChartSpec, StreamChunk};

/// One incremental result decoded from the stream.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    /// A fragment of assistant text. Concatenated in emission order, the
    /// fragments equal the full assistant message.
    TextDelta(String),
    /// A fragment of a tool call's JSON argument string. Fragments for one
    /// `call_id`, concatenated, form the complete arguments.
    ToolCallDelta {
        call_id: String,
        function_name: String,
        fragment: String,
    },
    /// Terminal event. Emitted exactly once, either for the `[DONE]`
    /// sentinel or when the source ends without one.
    StreamEnd,
}

/// Accumulation state for the (single) in-flight tool call.
///
/// The gateway sends the call id and function name only on the first delta;
/// continuation deltas carry bare argument fragments and attach to the most
/// recently opened call.
enum ToolCallState {
    Idle,
    Accumulating {
        id: String,
        name: String,
        arguments: String,
    },
}

/// Reassembles gateway SSE bytes into [`StreamEvent`]s.
///
/// One decoder instance serves one chat request: feed it chunks as they
/// arrive, then call [`StreamDecoder::finish`] when the source reports
/// end-of-stream.
pub struct StreamDecoder {
    buf: Vec<u8>,
    tool_call: ToolCallState,
    done: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            tool_call: ToolCallState::Idle,
            done: false,
        }
    }

    /// Consume one chunk of response bytes, returning the events completed
    /// by it. Bytes that do not yet form a full line are carried over to the
    /// next call.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }

        self.buf.extend_from_slice(chunk);

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop(); // the `\n`
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            match std::str::from_utf8(&line) {
                Ok(text) => self.decode_line(text, &mut events),
                Err(err) => {
                    tracing::debug!(%err, "skipping non-UTF-8 SSE line");
                }
            }

            if self.done {
                // Sentinel seen: anything still buffered is not processed.
                self.buf.clear();
                break;
            }
        }

        events
    }

    /// Best-effort final pass once the source has ended. Any leftover
    /// buffered content is decoded under the same per-line rules; a parse
    /// failure here is logged and dropped, since no further bytes can
    /// complete it. Emits the terminal [`StreamEvent::StreamEnd`] if the
    /// sentinel never arrived.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }

        let rest = std::mem::take(&mut self.buf);
        if !rest.is_empty() {
            match std::str::from_utf8(&rest) {
                Ok(text) => self.decode_line(text.trim_end_matches('\r'), &mut events),
                Err(err) => {
                    tracing::debug!(%err, "dropping non-UTF-8 trailing bytes");
                }
            }
        }

        if !self.done {
            self.done = true;
            events.push(StreamEvent::StreamEnd);
        }
        events
    }

    /// Apply the per-line protocol rules to one complete line.
    fn decode_line(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        if line.is_empty() || line.starts_with(':') {
            return;
        }
        let Some(payload) = line.strip_prefix("data: ") else {
            return;
        };
        let payload = payload.trim();

        if payload == "[DONE]" {
            self.done = true;
            events.push(StreamEvent::StreamEnd);
            return;
        }

        // A complete line that fails to parse is corrupt, not truncated: SSE
        // framing only delivers a line here once it was fully buffered. Skip
        // it and keep decoding.
        let chunk: StreamChunk = match serde_json::from_str(payload) {
            Ok(chunk) => chunk,
            Err(err) => {
                tracing::debug!(%err, "skipping undecodable SSE data line");
                return;
            }
        };

        let Some(choice) = chunk.choices.into_iter().next() else {
            return;
        };

        if let Some(content) = choice.delta.content {
            if !content.is_empty() {
                events.push(StreamEvent::TextDelta(content));
            }
        }

        for call in choice.delta.tool_calls.unwrap_or_default() {
            if let Some(id) = call.id {
                let name = call
                    .function
                    .as_ref()
                    .and_then(|f| f.name.clone())
                    .unwrap_or_default();
                self.tool_call = ToolCallState::Accumulating {
                    id,
                    name,
                    arguments: String::new(),
                };
            }

            let fragment = call
                .function
                .and_then(|f| f.arguments)
                .unwrap_or_default();
            if fragment.is_empty() {
                continue;
            }

            match &mut self.tool_call {
                ToolCallState::Accumulating {
                    id,
                    name,
                    arguments,
                } => {
                    arguments.push_str(&fragment);
                    events.push(StreamEvent::ToolCallDelta {
                        call_id: id.clone(),
                        function_name: name.clone(),
                        fragment,
                    });
                }
                ToolCallState::Idle => {
                    tracing::debug!("dropping tool-call fragment with no open call");
                }
            }
        }
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Folds a [`StreamEvent`] sequence into the final assistant message.
///
/// Text fragments are concatenated; tool-call fragments are re-joined into
/// the argument string of the single chart call. The chart is decoded once
/// at the end; malformed argument JSON drops the chart but keeps the text.
#[derive(Default)]
pub struct ResponseAssembler {
    content: String,
    call: Option<AssembledCall>,
}

struct AssembledCall {
    name: String,
    arguments: String,
}

impl ResponseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::TextDelta(text) => self.content.push_str(text),
            StreamEvent::ToolCallDelta {
                function_name,
                fragment,
                ..
            } => {
                let call = self.call.get_or_insert_with(|| AssembledCall {
                    name: function_name.clone(),
                    arguments: String::new(),
                });
                call.arguments.push_str(fragment);
            }
            StreamEvent::StreamEnd => {}
        }
    }

    pub fn finish(self) -> AssistantResponse {
        let chart = self
            .call
            .filter(|call| call.name == CHART_TOOL_NAME)
            .and_then(|call| ChartSpec::from_arguments(&call.arguments));

        AssistantResponse {
            content: self.content,
            chart,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
