// src/tools/openai_format.rs

use serde_json::{json, Value};

use super::types::ToolDefinition;

/// Convert tool definitions to OpenAI function calling format
pub fn tools_to_openai_format(tools: &[ToolDefinition]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters
                }
            })
        })
        .collect()
}
