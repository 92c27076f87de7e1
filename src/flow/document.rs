use super::conversion::IntoFlow;
use super::definition::{BranchLabel, FlowDefinition, FlowEdgeDefinition, FlowNodeDefinition};
use crate::error::FlowConversionError;
use serde::{Deserialize, Serialize};
use std::fs;

// These structs match the JSON the flow editor saves. Unknown keys (positions,
// styling) are ignored.

/// A flow as stored by the editor: `{nodes: [...], edges: [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowDocument {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl FlowDocument {
    pub fn from_json(json: &str) -> Result<Self, FlowConversionError> {
        serde_json::from_str(json)
            .map_err(|e| FlowConversionError::ValidationError(format!("Invalid flow JSON: {}", e)))
    }

    pub fn from_file(path: &str) -> Result<Self, FlowConversionError> {
        let content = fs::read_to_string(path).map_err(|e| {
            FlowConversionError::ValidationError(format!("Could not read '{}': {}", path, e))
        })?;
        Self::from_json(&content)
    }
}

impl IntoFlow for FlowDocument {
    fn into_flow(self) -> Result<FlowDefinition, FlowConversionError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|raw| {
                let label = match raw.data.get("label") {
                    None | Some(serde_json::Value::Null) => String::new(),
                    Some(serde_json::Value::String(s)) => s.clone(),
                    Some(other) => {
                        return Err(FlowConversionError::ValidationError(format!(
                            "Node '{}' has a non-string label: {}",
                            raw.id, other
                        )));
                    }
                };
                Ok(FlowNodeDefinition {
                    id: raw.id,
                    node_type: raw.node_type,
                    label,
                    data: raw.data,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let edges = self
            .edges
            .into_iter()
            .map(|raw| FlowEdgeDefinition {
                source: raw.source,
                target: raw.target,
                label: raw.label.map(BranchLabel::from),
            })
            .collect();

        Ok(FlowDefinition { nodes, edges })
    }
}
