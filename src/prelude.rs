//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the hassou crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use hassou::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let flow = FlowDocument::from_file("path/to/flow.json")?.into_flow()?;
//! let tree = BinaryTree::from_flow(&flow)?;
//!
//! let program = generate(&tree, &ItemLists::default());
//! println!("{}", program.text);
//! # Ok(())
//! # }
//! ```

// Flow model and loading
pub use crate::flow::{FlowDefinition, FlowDocument, IntoFlow, NodeKind};
pub use crate::graph::{FlowGraph, GraphLoader};

// Orders and collaborators
pub use crate::condition::{CatalogLookup, InventoryLookup, StaticCatalog, StaticInventory};
pub use crate::order::{LineItem, Order};

// Routing
pub use crate::interpreter::{FlowInterpreter, FulfillmentResult, RoutingOutcome};
pub use crate::store::{FlowStore, FulfillmentCheck, InMemoryFlowStore, check_fulfillment};

// Static compilation
pub use crate::tree::{BinaryTree, CompiledProgram, GeneratedProgram, ItemLists, generate};

// Error types
pub use crate::error::{FlowIntegrityError, GraphIntegrityError, RoutingError, TreeIntegrityError};

// Trace formatting
pub use crate::trace::TraceFormatter;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
