//! Decoding and evaluation of `field|operator|value` conditions.

mod evaluator;
pub mod lookup;
mod operators;

pub use evaluator::{EvalContext, SuppressedEvaluation, evaluate, evaluate_or_false};
pub use lookup::{CatalogLookup, InventoryLookup, StaticCatalog, StaticInventory};
pub use operators::{ComparisonFn, comparison};

use crate::error::ConditionSyntaxError;
use serde_json::Value;
use std::fmt;

/// A decoded condition. Field and operator stay as written so that an unknown
/// one surfaces at evaluation time, where it is reported and treated as false.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    pub value: Value,
    encoded: String,
}

impl Condition {
    /// Decodes `field|operator|value`. Everything after the second `|` is the
    /// JSON value, so the value itself may contain `|`.
    pub fn parse(encoded: &str) -> Result<Self, ConditionSyntaxError> {
        let mut parts = encoded.splitn(3, '|');
        let (field, operator, raw_value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(f), Some(o), Some(v)) => (f.trim(), o.trim(), v.trim()),
            _ => {
                return Err(ConditionSyntaxError::MissingSegments {
                    encoded: encoded.to_string(),
                });
            }
        };

        let value =
            serde_json::from_str(raw_value).map_err(|e| ConditionSyntaxError::InvalidValue {
                encoded: encoded.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            field: field.to_string(),
            operator: operator.to_string(),
            value,
            encoded: encoded.to_string(),
        })
    }

    /// Decodes a split node label, which omits the `line_items` field.
    pub fn parse_split(label: &str) -> Result<Self, ConditionSyntaxError> {
        Self::parse(&format!("line_items{}", label))
    }

    /// The condition as it was written in the flow.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}
