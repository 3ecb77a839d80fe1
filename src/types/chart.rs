// src/types/chart.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The ten chart shapes the `create_chart` tool can request.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Area,
    Scatter,
    Radar,
    RadialBar,
    Composed,
    Funnel,
    Treemap,
}

/// A chart request produced by decoding a completed tool-call argument
/// string. Data records are opaque key/value objects; the renderer decides
/// what to do with them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: Vec<Map<String, Value>>,
    #[serde(rename = "xKey", default, skip_serializing_if = "Option::is_none")]
    pub x_key: Option<String>,
    #[serde(rename = "yKey", default, skip_serializing_if = "Option::is_none")]
    pub y_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "dataKeys", default, skip_serializing_if = "Option::is_none")]
    pub data_keys: Option<Vec<String>>,
}

impl ChartSpec {
    /// Decode a completed tool-call argument string. Malformed JSON yields
    /// `None`; the failure is logged, never raised.
    pub fn from_arguments(raw: &str) -> Option<Self> {
        match serde_json::from_str::<ChartSpec>(raw) {
            Ok(spec) => Some(spec),
            Err(err) => {
                tracing::debug!(%err, "discarding undecodable chart arguments");
                None
            }
        }
    }

    /// Data values keyed by `key`, for callers that need a quick column view.
    pub fn column(&self, key: &str) -> Vec<&Value> {
        self.data.iter().filter_map(|row| row.get(key)).collect()
    }
}
