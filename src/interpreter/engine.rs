use super::fulfillment::FulfillmentAction;
use super::{FulfillmentResult, RoutingOutcome};
use crate::condition::{Condition, EvalContext, evaluate_or_false};
use crate::error::FlowIntegrityError;
use crate::flow::{BranchLabel, NodeKind};
use crate::graph::FlowGraph;
use crate::order::Order;
use crate::split::split;
use crate::trace::RouteStep;
use ahash::AHashMap;
use std::collections::VecDeque;

/// A node with its label decoded ahead of any run.
#[derive(Debug, Clone)]
pub(super) enum CompiledNode {
    Start,
    Condition(Condition),
    Split(Condition),
    Fulfill(FulfillmentAction),
}

impl CompiledNode {
    fn kind(&self) -> NodeKind {
        match self {
            CompiledNode::Start => NodeKind::Start,
            CompiledNode::Condition(_) => NodeKind::Condition,
            CompiledNode::Split(_) => NodeKind::Split,
            CompiledNode::Fulfill(_) => NodeKind::Fulfill,
        }
    }
}

/// One pending branch: the node to visit and the partial order that reached it.
struct Branch<'a> {
    node_id: &'a str,
    order: Order,
    route: Vec<RouteStep>,
}

/// The work-list driven walk of one order through a flow.
///
/// Lives for a single run; nothing here outlives `run`.
pub(super) struct Traversal<'a> {
    graph: &'a FlowGraph,
    nodes: &'a AHashMap<String, CompiledNode>,
    ctx: EvalContext<'a>,
    max_steps: usize,
}

impl<'a> Traversal<'a> {
    pub(super) fn new(
        graph: &'a FlowGraph,
        nodes: &'a AHashMap<String, CompiledNode>,
        ctx: EvalContext<'a>,
        max_steps: usize,
    ) -> Self {
        Self {
            graph,
            nodes,
            ctx,
            max_steps,
        }
    }

    pub(super) fn run(self, order: &Order) -> Result<RoutingOutcome, FlowIntegrityError> {
        let mut outcome = RoutingOutcome::default();
        let mut queue = VecDeque::new();
        queue.push_back(Branch {
            node_id: self.graph.start_node().id.as_str(),
            order: order.clone(),
            route: Vec::new(),
        });

        while let Some(branch) = queue.pop_front() {
            outcome.steps += 1;
            if outcome.steps > self.max_steps {
                return Err(FlowIntegrityError::StepLimitExceeded(self.max_steps));
            }

            let node = self
                .nodes
                .get(branch.node_id)
                .ok_or_else(|| FlowIntegrityError::UnknownNode(branch.node_id.to_string()))?;
            tracing::trace!(
                node_id = branch.node_id,
                kind = %node.kind(),
                items = branch.order.line_items.len(),
                "visiting node"
            );

            match node {
                CompiledNode::Start => {
                    let edges = self.graph.edges_from(branch.node_id);
                    let [edge] = edges[..] else {
                        return Err(FlowIntegrityError::InvalidStartEdges {
                            node_id: branch.node_id.to_string(),
                            found: edges.len(),
                        });
                    };
                    let route = extend(&branch.route, branch.node_id, node.kind(), None);
                    queue.push_back(Branch {
                        node_id: edge.target.as_str(),
                        order: branch.order,
                        route,
                    });
                }
                CompiledNode::Condition(condition) => {
                    let (yes, no) = self.branch_targets(branch.node_id)?;
                    let holds = evaluate_or_false(
                        branch.node_id,
                        condition,
                        &branch.order,
                        &self.ctx,
                        &mut outcome.suppressed,
                    );
                    let (label, target) = if holds {
                        (BranchLabel::Yes, yes)
                    } else {
                        (BranchLabel::No, no)
                    };
                    let route = extend(&branch.route, branch.node_id, node.kind(), Some(label));
                    queue.push_back(Branch {
                        node_id: target,
                        order: branch.order,
                        route,
                    });
                }
                CompiledNode::Split(condition) => {
                    let (yes, no) = self.branch_targets(branch.node_id)?;
                    let parts = split(branch.node_id, &branch.order, condition, &self.ctx);
                    outcome.suppressed.extend(parts.suppressed);

                    for (label, target, items) in [
                        (BranchLabel::Yes, yes, parts.matching),
                        (BranchLabel::No, no, parts.non_matching),
                    ] {
                        // An empty subset spawns no branch.
                        if items.is_empty() {
                            continue;
                        }
                        let route =
                            extend(&branch.route, branch.node_id, node.kind(), Some(label));
                        queue.push_back(Branch {
                            node_id: target,
                            order: branch.order.with_line_items(items),
                            route,
                        });
                    }
                }
                CompiledNode::Fulfill(action) => {
                    let route = extend(&branch.route, branch.node_id, node.kind(), None);
                    outcome.results.push(FulfillmentResult {
                        line_items: branch.order.line_items,
                        destination: action.destination.clone(),
                        fulfillment_option: action.fulfillment_option.clone(),
                        extra_data: action.extra_data.clone(),
                        node_id: branch.node_id.to_string(),
                        route,
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// The YES and NO targets of a branching node. Both must exist.
    fn branch_targets(&self, node_id: &str) -> Result<(&'a str, &'a str), FlowIntegrityError> {
        let target = |label: BranchLabel| {
            self.graph
                .edge_labeled(node_id, &label)
                .map(|edge| edge.target.as_str())
                .ok_or_else(|| FlowIntegrityError::MissingEdge {
                    node_id: node_id.to_string(),
                    label,
                })
        };
        Ok((target(BranchLabel::Yes)?, target(BranchLabel::No)?))
    }
}

fn extend(
    route: &[RouteStep],
    node_id: &str,
    kind: NodeKind,
    branch: Option<BranchLabel>,
) -> Vec<RouteStep> {
    let mut route = route.to_vec();
    route.push(RouteStep {
        node_id: node_id.to_string(),
        kind,
        branch,
    });
    route
}
