use crate::flow::BranchLabel;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while loading a flow definition into a `FlowGraph`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphIntegrityError {
    #[error("Edge #{edge_index} references node '{missing_node_id}' as its {endpoint}, but no such node exists")]
    NodeNotFound {
        edge_index: usize,
        missing_node_id: String,
        endpoint: &'static str,
    },

    #[error("Node id '{0}' is declared more than once")]
    DuplicateNode(String),

    #[error("Flow has no start node")]
    MissingStartNode,

    #[error("Flow has {} start nodes ({}), expected exactly one", .0.len(), .0.join(", "))]
    MultipleStartNodes(Vec<String>),

    #[error("Node '{node_id}' has an unregistered node type: '{type_name}'")]
    UnknownNodeType { node_id: String, type_name: String },
}

/// Errors raised when an encoded `field|operator|value` condition cannot be decoded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionSyntaxError {
    #[error("Condition '{encoded}' must have the form field|operator|value")]
    MissingSegments { encoded: String },

    #[error("Condition '{encoded}' has a value segment that is not valid JSON: {message}")]
    InvalidValue { encoded: String, message: String },
}

/// Errors raised when a fulfill node label cannot be decoded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FulfillmentSyntaxError {
    #[error("Fulfill node '{node_id}' label '{label}' must have the form destination|option|extra")]
    MissingSegments { node_id: String, label: String },

    #[error("Fulfill node '{node_id}' has extra data that is not valid JSON: {message}")]
    InvalidExtraData { node_id: String, message: String },
}

/// Errors returned by the inventory and catalog collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("No stock record for variant '{variant_id}' at location '{location_id}'")]
    StockNotFound {
        variant_id: String,
        location_id: String,
    },

    #[error("Collection '{0}' not found in the catalog")]
    CollectionNotFound(String),

    #[error("Lookup service unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while evaluating a single condition against an order.
///
/// These never escape a routing run: the evaluator boundary logs them, records
/// them on the outcome and treats the condition as false.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error(
        "Type mismatch while evaluating '{field}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: Value,
    },

    #[error("Condition on '{field}' is missing required key '{key}'")]
    MissingKey { field: String, key: &'static str },

    #[error("Order has no '{0}' attribute")]
    MissingOrderAttribute(&'static str),

    #[error("Unknown condition field '{0}'")]
    UnknownField(String),

    #[error("Operator '{operator}' is not supported for field '{field}'")]
    UnknownOperator { field: String, operator: String },

    #[error("Unknown line item match type '{0}'")]
    UnknownLineItemType(String),

    #[error("No {0} lookup is configured")]
    MissingCollaborator(&'static str),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Errors raised while traversing a flow. Any of these aborts the whole run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowIntegrityError {
    #[error("Node '{node_id}' has no outgoing {label} edge")]
    MissingEdge { node_id: String, label: BranchLabel },

    #[error("Start node '{node_id}' must have exactly one outgoing edge, found {found}")]
    InvalidStartEdges { node_id: String, found: usize },

    #[error("Node '{0}' is not part of the loaded flow")]
    UnknownNode(String),

    #[error("Traversal exceeded {0} steps; the flow likely contains a cycle")]
    StepLimitExceeded(usize),
}

/// Errors raised while building a binary tree from a flow.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeIntegrityError {
    #[error(transparent)]
    Graph(#[from] GraphIntegrityError),

    #[error("Node '{node_id}' would have more than two children")]
    TooManyChildren { node_id: String },

    #[error("Node '{node_id}' has more than one {branch} branch")]
    ConflictingBranch {
        node_id: String,
        branch: &'static str,
    },

    #[error("Node '{0}' is part of a cycle")]
    Cycle(String),

    #[error("Start node '{node_id}' must have exactly one child, found {found}")]
    InvalidStartEdges { node_id: String, found: usize },

    #[error("Tree refers to node #{0}, which does not exist")]
    InvalidIndex(usize),
}

/// Errors for persisted compiled program artifacts.
#[derive(Error, Debug, Clone)]
pub enum ArtifactError {
    #[error("Artifact I/O error: {0}")]
    Io(String),

    #[error("Artifact serialization failed: {0}")]
    Serialization(String),

    #[error("Artifact holds an invalid condition: {0}")]
    Condition(#[from] ConditionSyntaxError),

    #[error("Artifact holds an invalid tree: {0}")]
    Tree(#[from] TreeIntegrityError),
}

/// Errors raised by a `FlowStore`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Deployment for shop '{shop}' references flow '{flow_id}', which does not exist")]
    FlowNotFound { shop: String, flow_id: String },

    #[error("Flow store backend error: {0}")]
    Backend(String),
}

/// Errors that can occur when converting a custom user format into a `FlowDefinition`.
#[derive(Error, Debug, Clone)]
pub enum FlowConversionError {
    #[error("Invalid flow document: {0}")]
    ValidationError(String),
}

/// Umbrella error for building a router and running it end to end.
#[derive(Error, Debug, Clone)]
pub enum RoutingError {
    #[error(transparent)]
    Graph(#[from] GraphIntegrityError),

    #[error(transparent)]
    ConditionSyntax(#[from] ConditionSyntaxError),

    #[error(transparent)]
    FulfillmentSyntax(#[from] FulfillmentSyntaxError),

    #[error(transparent)]
    Flow(#[from] FlowIntegrityError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Conversion(#[from] FlowConversionError),
}
