//! # Hassou - Flow-Graph Fulfillment Routing Engine
//!
//! **Hassou** decides where the line items of an order are shipped from. A merchant
//! draws a flow of start, condition, split and fulfill nodes joined by `YES`/`NO`
//! edges; Hassou walks an order through that flow and returns one fulfillment
//! result per group of items that reached a fulfill node.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Flow**: Parse the editor's JSON into a [`FlowDocument`](flow::FlowDocument),
//!     or implement [`IntoFlow`](flow::IntoFlow) for your own format.
//! 2.  **Validate**: Load the resulting `FlowDefinition` into a [`FlowGraph`](graph::FlowGraph).
//!     Dangling edges, duplicate nodes and a missing start node are rejected here.
//! 3.  **Route**: Build a [`FlowInterpreter`](interpreter::FlowInterpreter) with the inventory
//!     and catalog lookups your conditions need and run it against each order.
//! 4.  **Or Compile**: Turn the same flow into a [`BinaryTree`](tree::BinaryTree) and
//!     generate nested `if`/`else` program text from it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hassou::prelude::*;
//! use std::sync::Arc;
//!
//! # fn run_example() -> Result<()> {
//! let flow = FlowDocument::from_file("path/to/flow.json")?.into_flow()?;
//! let graph = FlowGraph::load(&flow)?;
//!
//! let inventory = StaticInventory::from_file("path/to/inventory.json")?;
//! let interpreter = FlowInterpreter::builder(graph)
//!     .with_inventory(Arc::new(inventory))
//!     .build()?;
//!
//! let order = Order::from_file("path/to/order.json")?;
//! let outcome = interpreter.run(&order)?;
//! for result in &outcome.results {
//!     println!(
//!         "{} item(s) -> {} ({})",
//!         result.line_items.len(),
//!         result.destination,
//!         TraceFormatter::format_route(&result.route)
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Evaluation errors
//!
//! A condition that cannot be evaluated (a type mismatch, an unknown field, a failed
//! stock lookup) never aborts a run. It counts as false and is listed in
//! [`RoutingOutcome::suppressed`](interpreter::RoutingOutcome::suppressed). Structural
//! problems, such as a condition without a `NO` edge, abort the run with a
//! [`FlowIntegrityError`](error::FlowIntegrityError).

pub mod condition;
pub mod error;
pub mod flow;
pub mod graph;
pub mod interpreter;
pub mod order;
pub mod prelude;
pub mod split;
pub mod store;
pub mod trace;
pub mod tree;
