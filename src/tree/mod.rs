//! Static compilation of a flow into nested conditional program text.
//!
//! The tree builder commits every node to at most one left (true) and one right
//! (false) child, and the code generator renders that tree as `if`/`else` blocks.
//!
//! # Split semantics
//!
//! A generated program tests a split at the order level: "does any line item of
//! the order belong to the resolved list". It routes the whole order down one side.
//! The [`FlowInterpreter`](crate::interpreter::FlowInterpreter) instead partitions
//! the items and may follow both sides. The two strategies agree on every flow that
//! has no split nodes; with splits, a program reports the branch the order as a
//! whole would take.

mod builder;
mod codegen;
mod program;
mod visualizer;

pub use codegen::{Diagnostic, GeneratedProgram, ItemLists, generate};
pub use program::{CompiledProgram, ProgramRun, TerminalAction};

use crate::error::TreeIntegrityError;
use crate::flow::{FlowDefinition, NodeKind};
use crate::graph::FlowGraph;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

/// A flow with every node committed to at most two children.
///
/// Deserializing checks the same invariants as building, so a corrupted tree is
/// rejected instead of being traversed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TreeParts")]
pub struct BinaryTree {
    nodes: Vec<TreeNode>,
    root: usize,
}

#[derive(Deserialize)]
struct TreeParts {
    nodes: Vec<TreeNode>,
    root: usize,
}

impl TryFrom<TreeParts> for BinaryTree {
    type Error = TreeIntegrityError;

    fn try_from(parts: TreeParts) -> Result<Self, Self::Error> {
        let tree = BinaryTree {
            nodes: parts.nodes,
            root: parts.root,
        };
        tree.validate()?;
        Ok(tree)
    }
}

impl BinaryTree {
    /// Loads and validates the flow, then builds its tree.
    pub fn from_flow(flow: &FlowDefinition) -> Result<Self, TreeIntegrityError> {
        let graph = FlowGraph::load(flow)?;
        Self::build(&graph)
    }

    /// Builds the tree of an already loaded graph.
    ///
    /// An edge labeled `True` or `YES` becomes the left child of its source, an edge
    /// labeled `NO` the right child. Unlabeled edges take the left slot if it is
    /// still free, otherwise the right one.
    pub fn build(graph: &FlowGraph) -> Result<Self, TreeIntegrityError> {
        builder::build_tree(graph)
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[self.root]
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node_by_id(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn left(&self, node: &TreeNode) -> Option<&TreeNode> {
        node.left.and_then(|i| self.nodes.get(i))
    }

    pub fn right(&self, node: &TreeNode) -> Option<&TreeNode> {
        node.right.and_then(|i| self.nodes.get(i))
    }

    /// Rejects trees with out-of-range child indices or a node reachable from itself.
    fn validate(&self) -> Result<(), TreeIntegrityError> {
        let len = self.nodes.len();
        if self.root >= len {
            return Err(TreeIntegrityError::InvalidIndex(self.root));
        }
        let dangling = self
            .nodes
            .iter()
            .flat_map(|node| [node.left, node.right])
            .flatten()
            .find(|&child| child >= len);
        if let Some(index) = dangling {
            return Err(TreeIntegrityError::InvalidIndex(index));
        }

        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnPath,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        // (node, children already pushed)
        let mut stack = vec![(self.root, false)];
        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                marks[idx] = Mark::Done;
                continue;
            }
            if marks[idx] != Mark::Unvisited {
                continue;
            }
            marks[idx] = Mark::OnPath;
            stack.push((idx, true));

            let node = &self.nodes[idx];
            for child in [node.right, node.left].into_iter().flatten() {
                match marks[child] {
                    Mark::OnPath => {
                        return Err(TreeIntegrityError::Cycle(self.nodes[child].id.clone()));
                    }
                    Mark::Unvisited => stack.push((child, false)),
                    Mark::Done => {}
                }
            }
        }
        Ok(())
    }
}
