use crate::error::FulfillmentSyntaxError;
use serde_json::Value;

/// The decoded label of a fulfill node: `destination|option|extra`.
#[derive(Debug, Clone, PartialEq)]
pub struct FulfillmentAction {
    pub destination: Value,
    pub fulfillment_option: String,
    pub extra_data: Value,
}

impl FulfillmentAction {
    /// Decodes a fulfill label.
    ///
    /// The destination is JSON when it parses as JSON and a plain string otherwise.
    /// The extra data is everything after the second `|`; it must be JSON, or empty.
    pub fn parse(node_id: &str, label: &str) -> Result<Self, FulfillmentSyntaxError> {
        let mut parts = label.splitn(3, '|');
        let (destination, option, extra) = match (parts.next(), parts.next(), parts.next()) {
            (Some(d), Some(o), Some(e)) => (d.trim(), o.trim(), e.trim()),
            _ => {
                return Err(FulfillmentSyntaxError::MissingSegments {
                    node_id: node_id.to_string(),
                    label: label.to_string(),
                });
            }
        };

        let destination = serde_json::from_str(destination)
            .unwrap_or_else(|_| Value::String(destination.to_string()));

        let extra_data = if extra.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(extra).map_err(|e| FulfillmentSyntaxError::InvalidExtraData {
                node_id: node_id.to_string(),
                message: e.to_string(),
            })?
        };

        Ok(Self {
            destination,
            fulfillment_option: option.to_string(),
            extra_data,
        })
    }
}
