use crate::flow::{BranchLabel, NodeKind};
use itertools::Itertools;
use serde::Serialize;

/// One node visited on the way to a fulfill node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteStep {
    pub node_id: String,
    pub kind: NodeKind,
    /// The edge that was followed out of this node, if any.
    pub branch: Option<BranchLabel>,
}

/// Formats routes into human-readable strings
pub struct TraceFormatter;

impl TraceFormatter {
    /// Formats a route as `start:1 -> condition:2 [YES] -> fulfill:3`.
    pub fn format_route(route: &[RouteStep]) -> String {
        route
            .iter()
            .map(|step| match &step.branch {
                Some(label) => format!("{}:{} [{}]", step.kind, step.node_id, label),
                None => format!("{}:{}", step.kind, step.node_id),
            })
            .join(" -> ")
    }
}
