//! The addressable, immutable view of a flow that both execution strategies share.

use crate::error::GraphIntegrityError;
use crate::flow::{BranchLabel, FlowDefinition, NodeKind};
use ahash::AHashMap;

/// A node after its type name has been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub label: Option<BranchLabel>,
}

/// A validated flow. Built once per flow document and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    index: AHashMap<String, usize>,
    // node index -> edge indices, in insertion order
    outgoing: Vec<Vec<usize>>,
    start: usize,
}

/// Configures how node type names are resolved before loading a flow.
pub struct GraphLoader {
    registry: AHashMap<String, NodeKind>,
}

impl Default for GraphLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphLoader {
    pub fn new() -> Self {
        Self {
            registry: AHashMap::new(),
        }
    }

    /// Maps a custom node type name onto one of the built-in kinds.
    pub fn with_type_mapping(mut self, user_type_name: &str, kind: NodeKind) -> Self {
        self.registry.insert(user_type_name.to_string(), kind);
        self
    }

    fn resolve_kind(&self, node_id: &str, type_name: &str) -> Result<NodeKind, GraphIntegrityError> {
        self.registry
            .get(type_name)
            .copied()
            .or_else(|| NodeKind::from_type_name(type_name))
            .ok_or_else(|| GraphIntegrityError::UnknownNodeType {
                node_id: node_id.to_string(),
                type_name: type_name.to_string(),
            })
    }

    pub fn load(&self, flow: &FlowDefinition) -> Result<FlowGraph, GraphIntegrityError> {
        let mut nodes = Vec::with_capacity(flow.nodes.len());
        let mut index = AHashMap::with_capacity(flow.nodes.len());
        let mut starts = Vec::new();

        for def in &flow.nodes {
            if index.contains_key(&def.id) {
                return Err(GraphIntegrityError::DuplicateNode(def.id.clone()));
            }
            let kind = self.resolve_kind(&def.id, &def.node_type)?;
            if kind == NodeKind::Start {
                starts.push(nodes.len());
            }
            index.insert(def.id.clone(), nodes.len());
            nodes.push(GraphNode {
                id: def.id.clone(),
                kind,
                label: def.label.clone(),
                data: def.data.clone(),
            });
        }

        let start = match starts.as_slice() {
            [single] => *single,
            [] => return Err(GraphIntegrityError::MissingStartNode),
            many => {
                return Err(GraphIntegrityError::MultipleStartNodes(
                    many.iter().map(|&i| nodes[i].id.clone()).collect(),
                ));
            }
        };

        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut edges = Vec::with_capacity(flow.edges.len());
        for (edge_index, def) in flow.edges.iter().enumerate() {
            let source_idx = *index.get(&def.source).ok_or_else(|| {
                GraphIntegrityError::NodeNotFound {
                    edge_index,
                    missing_node_id: def.source.clone(),
                    endpoint: "source",
                }
            })?;
            if !index.contains_key(&def.target) {
                return Err(GraphIntegrityError::NodeNotFound {
                    edge_index,
                    missing_node_id: def.target.clone(),
                    endpoint: "target",
                });
            }
            outgoing[source_idx].push(edges.len());
            edges.push(GraphEdge {
                source: def.source.clone(),
                target: def.target.clone(),
                label: def.label.clone(),
            });
        }

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            start = %nodes[start].id,
            "loaded flow graph"
        );

        Ok(FlowGraph {
            nodes,
            edges,
            index,
            outgoing,
            start,
        })
    }
}

impl FlowGraph {
    /// Loads a flow using only the built-in node type names.
    pub fn load(flow: &FlowDefinition) -> Result<Self, GraphIntegrityError> {
        GraphLoader::new().load(flow)
    }

    pub fn loader() -> GraphLoader {
        GraphLoader::new()
    }

    pub fn node_by_id(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Outgoing edges of a node, in the order they appear in the flow definition.
    pub fn edges_from(&self, id: &str) -> Vec<&GraphEdge> {
        self.index
            .get(id)
            .map(|&i| self.outgoing[i].iter().map(|&e| &self.edges[e]).collect())
            .unwrap_or_default()
    }

    /// The first outgoing edge carrying `label`, if any.
    pub fn edge_labeled(&self, id: &str, label: &BranchLabel) -> Option<&GraphEdge> {
        self.edges_from(id)
            .into_iter()
            .find(|edge| edge.label.as_ref() == Some(label))
    }

    pub fn start_node(&self) -> &GraphNode {
        &self.nodes[self.start]
    }

    /// Position of the start node in [`FlowGraph::nodes`].
    pub(crate) fn start_index(&self) -> usize {
        self.start
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }
}
