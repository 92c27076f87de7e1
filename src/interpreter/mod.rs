use crate::condition::{CatalogLookup, Condition, EvalContext, InventoryLookup, SuppressedEvaluation};
use crate::error::{FlowIntegrityError, RoutingError};
use crate::flow::NodeKind;
use crate::graph::FlowGraph;
use crate::order::{LineItem, Order, id_from_value};
use crate::trace::RouteStep;
use ahash::AHashMap;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

mod engine;
mod fulfillment;

use engine::{CompiledNode, Traversal};
pub use fulfillment::FulfillmentAction;

/// The default bound on visited nodes per run.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// A routing decision for one subset of an order's line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FulfillmentResult {
    pub line_items: Vec<LineItem>,
    pub destination: serde_json::Value,
    pub fulfillment_option: String,
    pub extra_data: serde_json::Value,
    /// The fulfill node that produced this result.
    pub node_id: String,
    /// The nodes visited from the start node to the fulfill node.
    pub route: Vec<RouteStep>,
}

impl FulfillmentResult {
    /// The destination's identifier: the destination itself when it is a plain
    /// string or number, or its `id` when it is an object.
    pub fn destination_id(&self) -> Option<String> {
        match &self.destination {
            serde_json::Value::Object(map) => map.get("id").and_then(id_from_value),
            other => id_from_value(other),
        }
    }
}

/// The result of routing one order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingOutcome {
    /// Fulfillment results, in the order their branches terminated.
    pub results: Vec<FulfillmentResult>,
    /// Conditions that failed to evaluate and were treated as false.
    pub suppressed: Vec<SuppressedEvaluation>,
    /// Number of nodes visited across all branches.
    pub steps: usize,
}

/// Routes orders through a loaded flow.
///
/// A `FlowInterpreter` decodes every node label once when it is built and can then
/// be used repeatedly, and from several threads at once, to route different orders.
/// Each call to [`FlowInterpreter::run`] keeps its work list and partial orders to
/// itself.
pub struct FlowInterpreter {
    graph: Arc<FlowGraph>,
    nodes: AHashMap<String, CompiledNode>,
    inventory: Option<Arc<dyn InventoryLookup>>,
    catalog: Option<Arc<dyn CatalogLookup>>,
    max_steps: usize,
}

pub struct FlowInterpreterBuilder {
    graph: Arc<FlowGraph>,
    inventory: Option<Arc<dyn InventoryLookup>>,
    catalog: Option<Arc<dyn CatalogLookup>>,
    max_steps: usize,
}

impl FlowInterpreterBuilder {
    pub fn new(graph: impl Into<Arc<FlowGraph>>) -> Self {
        Self {
            graph: graph.into(),
            inventory: None,
            catalog: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_inventory(mut self, inventory: Arc<dyn InventoryLookup>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogLookup>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Caps the number of nodes a single run may visit.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Decodes every node label. A malformed condition or fulfill label fails here,
    /// before any order is routed.
    pub fn build(self) -> Result<FlowInterpreter, RoutingError> {
        let mut nodes = AHashMap::with_capacity(self.graph.nodes().len());
        for node in self.graph.nodes() {
            let compiled = match node.kind {
                NodeKind::Start => CompiledNode::Start,
                NodeKind::Condition => CompiledNode::Condition(Condition::parse(&node.label)?),
                NodeKind::Split => CompiledNode::Split(Condition::parse_split(&node.label)?),
                NodeKind::Fulfill => {
                    CompiledNode::Fulfill(FulfillmentAction::parse(&node.id, &node.label)?)
                }
            };
            nodes.insert(node.id.clone(), compiled);
        }

        Ok(FlowInterpreter {
            graph: self.graph,
            nodes,
            inventory: self.inventory,
            catalog: self.catalog,
            max_steps: self.max_steps,
        })
    }
}

impl FlowInterpreter {
    pub fn builder(graph: impl Into<Arc<FlowGraph>>) -> FlowInterpreterBuilder {
        FlowInterpreterBuilder::new(graph)
    }

    /// Builds an interpreter without inventory or catalog lookups.
    pub fn new(graph: impl Into<Arc<FlowGraph>>) -> Result<Self, RoutingError> {
        Self::builder(graph).build()
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    fn context(&self) -> EvalContext<'_> {
        EvalContext {
            inventory: self.inventory.as_deref(),
            catalog: self.catalog.as_deref(),
        }
    }

    /// Routes one order through the flow.
    ///
    /// # Returns
    ///
    /// * `Ok(RoutingOutcome)`: every branch reached a fulfill node or ran out of items.
    ///   Conditions that failed to evaluate are listed in `suppressed`.
    /// * `Err(FlowIntegrityError)`: the flow is missing a required edge or loops. No
    ///   partial results are returned.
    pub fn run(&self, order: &Order) -> Result<RoutingOutcome, FlowIntegrityError> {
        let span = tracing::debug_span!("route_order", items = order.line_items.len());
        let _guard = span.enter();

        let traversal = Traversal::new(&self.graph, &self.nodes, self.context(), self.max_steps);
        let outcome = traversal.run(order)?;

        tracing::debug!(
            results = outcome.results.len(),
            suppressed = outcome.suppressed.len(),
            steps = outcome.steps,
            "order routed"
        );
        Ok(outcome)
    }

    /// Routes independent orders in parallel. Results keep the order of `orders`.
    pub fn run_batch(&self, orders: &[Order]) -> Vec<Result<RoutingOutcome, FlowIntegrityError>> {
        orders.par_iter().map(|order| self.run(order)).collect()
    }
}
