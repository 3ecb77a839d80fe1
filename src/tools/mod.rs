// src/tools/mod.rs

pub mod openai_format;
pub mod registry;
pub mod types;

pub use openai_format::tools_to_openai_format;
pub use registry::{get_all_tools, get_tool_by_name, CHART_TOOL_NAME};
pub use types::ToolDefinition;
