use serde::{Deserialize, Serialize};
use std::fmt;

/// The complete, canonical definition of a routing flow, ready to be loaded.
/// This is the target structure for any custom data model conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub nodes: Vec<FlowNodeDefinition>,
    pub edges: Vec<FlowEdgeDefinition>,
}

/// A single node of the flow. The meaning of `label` depends on the node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNodeDefinition {
    pub id: String,
    pub node_type: String,
    pub label: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdgeDefinition {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: Option<BranchLabel>,
}

/// The four node kinds a flow is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    Condition,
    Split,
    Fulfill,
}

impl NodeKind {
    /// Resolves one of the built-in type names, including the legacy `fullfill` spelling.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(NodeKind::Start),
            "condition" => Some(NodeKind::Condition),
            "split" => Some(NodeKind::Split),
            "fulfill" | "fullfill" => Some(NodeKind::Fulfill),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Condition => "condition",
            NodeKind::Split => "split",
            NodeKind::Fulfill => "fulfill",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The label carried by an edge.
///
/// `Yes`/`No` drive the interpreter. `True` and unlabeled edges are only meaningful
/// to the tree builder, which assigns children in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BranchLabel {
    Yes,
    No,
    True,
    Other(String),
}

impl BranchLabel {
    /// Whether the label marks the branch taken when a test holds.
    pub fn is_true_branch(&self) -> bool {
        matches!(self, BranchLabel::Yes | BranchLabel::True)
    }
}

impl From<&str> for BranchLabel {
    fn from(label: &str) -> Self {
        match label {
            "YES" => BranchLabel::Yes,
            "NO" => BranchLabel::No,
            "True" => BranchLabel::True,
            other => BranchLabel::Other(other.to_string()),
        }
    }
}

impl From<String> for BranchLabel {
    fn from(label: String) -> Self {
        BranchLabel::from(label.as_str())
    }
}

impl From<BranchLabel> for String {
    fn from(label: BranchLabel) -> Self {
        label.to_string()
    }
}

impl fmt::Display for BranchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchLabel::Yes => f.write_str("YES"),
            BranchLabel::No => f.write_str("NO"),
            BranchLabel::True => f.write_str("True"),
            BranchLabel::Other(label) => f.write_str(label),
        }
    }
}
