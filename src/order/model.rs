use super::de;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;

fn default_quantity() -> u32 {
    1
}

/// A single line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "de::opt_id")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Any other fields of the platform payload, kept untouched.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl LineItem {
    pub fn for_product(product_id: &str) -> Self {
        Self {
            product_id: Some(de::normalize_id(product_id).to_string()),
            variant_id: None,
            sku: None,
            quantity: 1,
            attributes: serde_json::Map::new(),
        }
    }

    pub fn with_variant(mut self, variant_id: &str) -> Self {
        self.variant_id = Some(de::normalize_id(variant_id).to_string());
        self
    }

    pub fn with_sku(mut self, sku: &str) -> Self {
        self.sku = Some(sku.to_string());
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

/// An order, or the part of one that travels down a single branch of a flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default, deserialize_with = "de::tags")]
    pub tags: BTreeSet<String>,
    #[serde(default, alias = "total_price", deserialize_with = "de::opt_number")]
    pub price: Option<f64>,
}

impl Order {
    pub fn new(line_items: Vec<LineItem>) -> Self {
        Self {
            line_items,
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// A new partial order carrying this order's attributes and the given items.
    pub fn with_line_items(&self, line_items: Vec<LineItem>) -> Self {
        Self {
            line_items,
            tags: self.tags.clone(),
            price: self.price,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load an order from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}
