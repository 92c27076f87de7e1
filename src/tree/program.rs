use super::{BinaryTree, ItemLists, TreeNode};
use crate::condition::{Condition, EvalContext, SuppressedEvaluation, evaluate_or_false};
use crate::error::ArtifactError;
use crate::flow::NodeKind;
use crate::order::{LineItem, Order};
use ahash::AHashMap;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

/// The fulfill node a program run ended on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminalAction {
    pub node_id: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramRun {
    /// `None` when the run fell through an empty branch or an omitted split.
    pub terminal: Option<TerminalAction>,
    pub suppressed: Vec<SuppressedEvaluation>,
}

#[derive(Serialize, Deserialize)]
struct ProgramArtifact {
    tree: BinaryTree,
    lists: ItemLists,
}

/// The executable form of a generated program.
///
/// Runs an order through the tree exactly the way the text from
/// [`generate`](super::generate) would: conditions pick one side, a split checks
/// whether any item of the whole order is in its list, and the first fulfill node
/// reached ends the run.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    tree: BinaryTree,
    lists: ItemLists,
    conditions: AHashMap<usize, Condition>,
}

impl CompiledProgram {
    /// Decodes every condition label of the tree.
    pub fn new(tree: BinaryTree, lists: ItemLists) -> Result<Self, ArtifactError> {
        tree.validate()?;
        let conditions = tree
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.kind == NodeKind::Condition)
            .map(|(idx, node)| Condition::parse(&node.label).map(|c| (idx, c)))
            .collect::<Result<AHashMap<_, _>, _>>()?;
        Ok(Self {
            tree,
            lists,
            conditions,
        })
    }

    pub fn tree(&self) -> &BinaryTree {
        &self.tree
    }

    pub fn lists(&self) -> &ItemLists {
        &self.lists
    }

    pub fn execute(&self, order: &Order, ctx: &EvalContext<'_>) -> ProgramRun {
        let mut run = ProgramRun::default();
        let mut current = Some(self.tree.root);

        while let Some(idx) = current {
            let node = &self.tree.nodes[idx];
            current = match node.kind {
                NodeKind::Start => node.left,
                NodeKind::Condition => {
                    let holds = match self.conditions.get(&idx) {
                        Some(condition) => evaluate_or_false(
                            &node.id,
                            condition,
                            order,
                            ctx,
                            &mut run.suppressed,
                        ),
                        None => false,
                    };
                    if holds { node.left } else { node.right }
                }
                NodeKind::Split => match self.lists.get(node.label.trim()) {
                    Some(ids) if contains_any(&order.line_items, ids) => node.left,
                    Some(_) => node.right,
                    // Omitted from the program text, so nothing runs.
                    None => None,
                },
                NodeKind::Fulfill => {
                    run.terminal = Some(terminal(node));
                    None
                }
            };
        }
        run
    }

    /// Saves the program to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), ArtifactError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path)
            .map_err(|e| ArtifactError::Io(format!("Could not create file '{}': {}", path, e)))?;
        file.write_all(&bytes).map_err(|e| {
            ArtifactError::Io(format!("Could not write to file '{}': {}", path, e))
        })?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let artifact = ProgramArtifact {
            tree: self.tree.clone(),
            lists: self.lists.clone(),
        };
        encode_to_vec(&artifact, standard())
            .map_err(|e| ArtifactError::Serialization(format!("Serialization failed: {}", e)))
    }

    /// Loads a program saved with [`CompiledProgram::save`].
    pub fn from_file(path: &str) -> Result<Self, ArtifactError> {
        let mut file = fs::File::open(path)
            .map_err(|e| ArtifactError::Io(format!("Could not open file '{}': {}", path, e)))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| {
            ArtifactError::Io(format!("Could not read from file '{}': {}", path, e))
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let (artifact, _): (ProgramArtifact, usize) = decode_from_slice(bytes, standard())
            .map_err(|e| ArtifactError::Serialization(format!("Deserialization failed: {}", e)))?;
        Self::new(artifact.tree, artifact.lists)
    }
}

fn contains_any(items: &[LineItem], ids: &[String]) -> bool {
    items.iter().any(|item| {
        [&item.product_id, &item.variant_id, &item.sku]
            .into_iter()
            .flatten()
            .any(|id| ids.contains(id))
    })
}

fn terminal(node: &TreeNode) -> TerminalAction {
    TerminalAction {
        node_id: node.id.clone(),
        label: node.label.clone(),
    }
}
