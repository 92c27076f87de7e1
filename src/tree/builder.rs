use super::{BinaryTree, TreeNode};
use crate::error::TreeIntegrityError;
use crate::flow::BranchLabel;
use crate::graph::{FlowGraph, GraphEdge};
use ahash::AHashMap;

/// Assigns every edge of `graph` to the left or right slot of its source node.
pub(super) fn build_tree(graph: &FlowGraph) -> Result<BinaryTree, TreeIntegrityError> {
    let mut index = AHashMap::with_capacity(graph.nodes().len());
    let mut nodes: Vec<TreeNode> = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| {
            index.insert(node.id.as_str(), i);
            TreeNode {
                id: node.id.clone(),
                kind: node.kind,
                label: node.label.clone(),
                left: None,
                right: None,
            }
        })
        .collect();

    // Edges grouped by source, keeping their order in the flow.
    let mut outgoing: Vec<Vec<&GraphEdge>> = vec![Vec::new(); nodes.len()];
    for edge in graph.edges() {
        // Both endpoints were checked when the graph was loaded.
        if let Some(&source) = index.get(edge.source.as_str()) {
            outgoing[source].push(edge);
        }
    }

    let start = graph.start_index();
    if outgoing[start].len() != 1 {
        return Err(TreeIntegrityError::InvalidStartEdges {
            node_id: nodes[start].id.clone(),
            found: outgoing[start].len(),
        });
    }

    for (source, edges) in outgoing.iter().enumerate() {
        if edges.is_empty() {
            continue;
        }
        let node_id = &nodes[source].id;
        if edges.len() > 2 {
            return Err(TreeIntegrityError::TooManyChildren {
                node_id: node_id.clone(),
            });
        }

        let mut true_branch = None;
        let mut false_branch = None;
        let mut unlabeled = Vec::new();
        for edge in edges {
            let Some(&target) = index.get(edge.target.as_str()) else {
                continue;
            };
            match &edge.label {
                Some(label) if label.is_true_branch() => {
                    if true_branch.replace(target).is_some() {
                        return Err(conflict(node_id, "true"));
                    }
                }
                Some(BranchLabel::No) => {
                    if false_branch.replace(target).is_some() {
                        return Err(conflict(node_id, "false"));
                    }
                }
                _ => unlabeled.push(target),
            }
        }

        // Unlabeled edges fill the left slot first, then the right one.
        let mut unlabeled = unlabeled.into_iter();
        let left = true_branch.or_else(|| unlabeled.next());
        let right = false_branch.or_else(|| unlabeled.next());

        let node = &mut nodes[source];
        node.left = left;
        node.right = right;
    }

    // Tree nodes share their positions with the graph's nodes.
    let tree = BinaryTree { nodes, root: start };
    tree.validate()?;
    Ok(tree)
}

fn conflict(node_id: &str, branch: &'static str) -> TreeIntegrityError {
    TreeIntegrityError::ConflictingBranch {
        node_id: node_id.to_string(),
        branch,
    }
}
