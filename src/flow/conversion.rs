use super::definition::FlowDefinition;
use crate::error::FlowConversionError;

/// A trait for custom data models that can be converted into a `FlowDefinition`.
///
/// This is the extension point for loading flows authored in other editors. By
/// implementing this trait on your own structs, you provide a translation layer
/// into the canonical model that `FlowGraph` and `BinaryTree` consume.
///
/// # Example
///
/// ```rust,no_run
/// use hassou::prelude::*;
/// use hassou::error::FlowConversionError;
/// use hassou::flow::FlowNodeDefinition;
///
/// struct MyStep { id: String, kind: String, rule: String }
/// struct MyFlow { steps: Vec<MyStep> }
///
/// impl IntoFlow for MyFlow {
///     fn into_flow(self) -> std::result::Result<FlowDefinition, FlowConversionError> {
///         let nodes = self
///             .steps
///             .into_iter()
///             .map(|step| FlowNodeDefinition {
///                 id: step.id,
///                 node_type: step.kind,
///                 label: step.rule,
///                 data: serde_json::Value::Null,
///             })
///             .collect();
///         Ok(FlowDefinition { nodes, edges: vec![] })
///     }
/// }
/// ```
pub trait IntoFlow {
    /// Consumes the object and converts it into a routing flow.
    fn into_flow(self) -> Result<FlowDefinition, FlowConversionError>;
}

impl IntoFlow for FlowDefinition {
    fn into_flow(self) -> Result<FlowDefinition, FlowConversionError> {
        Ok(self)
    }
}
