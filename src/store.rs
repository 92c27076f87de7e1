//! Where deployed flows come from, and the single-call routing entry point.

use crate::condition::{CatalogLookup, InventoryLookup};
use crate::error::{RoutingError, StoreError};
use crate::flow::FlowDefinition;
use crate::graph::FlowGraph;
use crate::interpreter::{FlowInterpreter, FulfillmentResult, RoutingOutcome};
use crate::order::Order;
use ahash::AHashMap;
use std::sync::Arc;

/// A source of flows deployed per shop.
pub trait FlowStore: Send + Sync {
    /// The most recently deployed flow of `shop`, or `None` when the shop has
    /// never deployed one.
    fn latest_deployed(&self, shop: &str) -> Result<Option<FlowDefinition>, StoreError>;
}

#[derive(Debug, Clone)]
struct Deployment {
    flow_id: String,
    created_at: u64,
}

/// A `FlowStore` held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFlowStore {
    flows: AHashMap<String, FlowDefinition>,
    deployments: AHashMap<String, Vec<Deployment>>,
}

impl InMemoryFlowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_flow(mut self, flow_id: &str, flow: FlowDefinition) -> Self {
        self.flows.insert(flow_id.to_string(), flow);
        self
    }

    /// Records that `shop` deployed `flow_id` at `created_at`. The flow does not
    /// have to exist yet.
    pub fn deploy(mut self, shop: &str, flow_id: &str, created_at: u64) -> Self {
        self.deployments
            .entry(shop.to_string())
            .or_default()
            .push(Deployment {
                flow_id: flow_id.to_string(),
                created_at,
            });
        self
    }
}

impl FlowStore for InMemoryFlowStore {
    fn latest_deployed(&self, shop: &str) -> Result<Option<FlowDefinition>, StoreError> {
        // On equal timestamps the later deployment wins.
        let latest = self
            .deployments
            .get(shop)
            .and_then(|deployments| deployments.iter().max_by_key(|d| d.created_at));
        let Some(deployment) = latest else {
            return Ok(None);
        };

        self.flows
            .get(&deployment.flow_id)
            .cloned()
            .map(Some)
            .ok_or_else(|| StoreError::FlowNotFound {
                shop: shop.to_string(),
                flow_id: deployment.flow_id.clone(),
            })
    }
}

/// The answer to "where does this order go" for one shop.
#[derive(Debug, Clone, PartialEq)]
pub enum FulfillmentCheck {
    /// The shop has no deployed flow. Not an error.
    NoFlowDeployed,
    Routed(RoutingOutcome),
}

impl FulfillmentCheck {
    pub fn results(&self) -> &[FulfillmentResult] {
        match self {
            FulfillmentCheck::NoFlowDeployed => &[],
            FulfillmentCheck::Routed(outcome) => &outcome.results,
        }
    }
}

/// Loads the shop's latest deployed flow and routes `order` through it.
pub fn check_fulfillment(
    store: &dyn FlowStore,
    shop: &str,
    order: &Order,
    inventory: Option<Arc<dyn InventoryLookup>>,
    catalog: Option<Arc<dyn CatalogLookup>>,
) -> Result<FulfillmentCheck, RoutingError> {
    let Some(flow) = store.latest_deployed(shop)? else {
        tracing::info!(shop, "no flow deployed");
        return Ok(FulfillmentCheck::NoFlowDeployed);
    };

    let graph = FlowGraph::load(&flow)?;
    let mut builder = FlowInterpreter::builder(graph);
    if let Some(inventory) = inventory {
        builder = builder.with_inventory(inventory);
    }
    if let Some(catalog) = catalog {
        builder = builder.with_catalog(catalog);
    }

    let outcome = builder.build()?.run(order)?;
    Ok(FulfillmentCheck::Routed(outcome))
}
