// src/tools/types.rs

use serde::{Deserialize, Serialize};

/// A tool the assistant may call, described by its JSON-schema parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}
