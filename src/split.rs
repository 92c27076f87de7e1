use crate::condition::{Condition, EvalContext, SuppressedEvaluation, evaluate_or_false};
use crate::order::{LineItem, Order};

/// The two disjoint halves of a line-item collection after a split.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitOutcome {
    pub matching: Vec<LineItem>,
    pub non_matching: Vec<LineItem>,
    /// Per-item evaluations that failed and counted as non-matching.
    pub suppressed: Vec<SuppressedEvaluation>,
}

/// Partitions `parent`'s line items by testing each one on its own.
///
/// Every item lands in exactly one half and both halves keep the input order.
pub fn split(
    node_id: &str,
    parent: &Order,
    condition: &Condition,
    ctx: &EvalContext<'_>,
) -> SplitOutcome {
    let mut outcome = SplitOutcome::default();
    for item in &parent.line_items {
        let singleton = parent.with_line_items(vec![item.clone()]);
        if evaluate_or_false(node_id, condition, &singleton, ctx, &mut outcome.suppressed) {
            outcome.matching.push(item.clone());
        } else {
            outcome.non_matching.push(item.clone());
        }
    }

    tracing::debug!(
        node_id,
        matching = outcome.matching.len(),
        non_matching = outcome.non_matching.len(),
        "split line items"
    );
    outcome
}
