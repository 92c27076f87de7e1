use super::{BinaryTree, TreeNode};
use crate::flow::NodeKind;
use ahash::AHashMap;
use itertools::Itertools;
use serde::Serialize;

/// Maps a split node's list name to the item ids that belong to it.
pub type ItemLists = AHashMap<String, Vec<String>>;

/// A problem found while generating code. Generation carries on past it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub node_id: String,
    pub message: String,
}

/// The text of a generated program and everything that was left out of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedProgram {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

const INDENT: &str = "    ";

/// Renders `tree` as nested `if`/`else` program text.
///
/// A split node whose list name is empty or missing from `lists` is left out
/// together with its subtree, and a [`Diagnostic`] is recorded for it.
pub fn generate(tree: &BinaryTree, lists: &ItemLists) -> GeneratedProgram {
    let mut generator = Generator {
        tree,
        lists,
        text: String::new(),
        diagnostics: Vec::new(),
    };
    generator.body(Some(tree.root()), 0);

    tracing::debug!(
        nodes = tree.nodes().len(),
        diagnostics = generator.diagnostics.len(),
        "program generated"
    );
    GeneratedProgram {
        text: generator.text,
        diagnostics: generator.diagnostics,
    }
}

struct Generator<'a> {
    tree: &'a BinaryTree,
    lists: &'a ItemLists,
    text: String,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Generator<'a> {
    /// Emits a block body, falling back to `pass` when nothing was emitted.
    fn body(&mut self, node: Option<&TreeNode>, depth: usize) {
        let before = self.text.len();
        if let Some(node) = node {
            self.node(node, depth);
        }
        if self.text.len() == before {
            self.line(depth, "pass");
        }
    }

    fn node(&mut self, node: &TreeNode, depth: usize) {
        let tree = self.tree;
        match node.kind {
            NodeKind::Start => self.body(tree.left(node), depth),
            NodeKind::Condition => {
                self.line(depth, &format!("if {}:", node.label));
                self.branches(node, depth);
            }
            NodeKind::Split => {
                let Some(ids) = self.resolve(node) else {
                    return;
                };
                let ids = ids.iter().map(|id| quote(id)).join(", ");
                self.line(
                    depth,
                    &format!("if any(item in [{}] for item in order.items):", ids),
                );
                self.branches(node, depth);
            }
            NodeKind::Fulfill => self.line(depth, &format!("fulfill({})", quote(&node.label))),
        }
    }

    fn branches(&mut self, node: &TreeNode, depth: usize) {
        let tree = self.tree;
        self.body(tree.left(node), depth + 1);
        self.line(depth, "else:");
        self.body(tree.right(node), depth + 1);
    }

    fn resolve(&mut self, node: &TreeNode) -> Option<&'a [String]> {
        let lists = self.lists;
        let list_name = node.label.trim();
        let message = if list_name.is_empty() {
            "split node has no list name".to_string()
        } else if let Some(ids) = lists.get(list_name) {
            return Some(ids);
        } else {
            format!("list '{}' not found", list_name)
        };

        tracing::warn!(node_id = %node.id, "{}, subtree omitted", message);
        self.diagnostics.push(Diagnostic {
            node_id: node.id.clone(),
            message,
        });
        None
    }

    fn line(&mut self, depth: usize, content: &str) {
        for _ in 0..depth {
            self.text.push_str(INDENT);
        }
        self.text.push_str(content);
        self.text.push('\n');
    }
}

/// A double-quoted string literal with `\` and `"` escaped.
fn quote(raw: &str) -> String {
    let escaped = raw.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}
