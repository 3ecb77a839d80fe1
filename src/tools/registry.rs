// src/tools/registry.rs

use once_cell::sync::Lazy;
use serde_json::json;

use super::types::ToolDefinition;

/// Name of the chart-generation tool attached to every gateway request.
pub const CHART_TOOL_NAME: &str = "create_chart";

pub static BUILT_IN_TOOLS: Lazy<Vec<ToolDefinition>> = Lazy::new(|| {
    vec![ToolDefinition {
        name: CHART_TOOL_NAME.to_string(),
        description: "Create a chart or graph from provided data. Use this when users ask to visualize data in any type of chart including bar, line, pie, area, scatter, radar, radial bar, composed, funnel, or treemap charts.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "enum": ["bar", "line", "pie", "area", "scatter", "radar", "radialBar", "composed", "funnel", "treemap"],
                    "description": "The type of chart to create: bar (column chart), line (line graph), pie (pie chart), area (filled area chart), scatter (scatter plot), radar (radar/spider chart), radialBar (radial bar chart), composed (combination of multiple chart types), funnel (funnel chart), treemap (hierarchical treemap)"
                },
                "data": {
                    "type": "array",
                    "items": {
                        "type": "object"
                    },
                    "description": "Array of data points. Each object should have keys for the chart axes (e.g., {name: 'Jan', value: 100}) or for treemap {name: 'Category', size: 100, children: [...]}"
                },
                "xKey": {
                    "type": "string",
                    "description": "The key in data objects to use for x-axis (default: 'name'). Not used for pie, radialBar, funnel, or treemap charts."
                },
                "yKey": {
                    "type": "string",
                    "description": "The key in data objects to use for y-axis or values (default: 'value')"
                },
                "title": {
                    "type": "string",
                    "description": "Title for the chart"
                },
                "dataKeys": {
                    "type": "array",
                    "items": {
                        "type": "string"
                    },
                    "description": "For composed charts: array of data keys to plot (e.g., ['sales', 'revenue', 'profit'])"
                }
            },
            "required": ["type", "data"]
        }),
    }]
});

pub fn get_all_tools() -> Vec<ToolDefinition> {
    BUILT_IN_TOOLS.clone()
}

pub fn get_tool_by_name(name: &str) -> Option<ToolDefinition> {
    BUILT_IN_TOOLS.iter().find(|t| t.name == name).cloned()
}
