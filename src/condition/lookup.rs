//! Ports to the inventory and catalog services conditions depend on.
//!
//! Implementations must be safe to share across threads; the interpreter calls them
//! synchronously and leaves retries and caching to the implementation.

use crate::error::LookupError;
use crate::order::normalize_id;
use ahash::{AHashMap, AHashSet};
use serde::Deserialize;
use std::fs;

/// Resolves the current stock of a variant at a fulfillment location.
pub trait InventoryLookup: Send + Sync {
    fn stock(&self, variant_id: &str, location_id: &str) -> Result<i64, LookupError>;
}

/// Resolves the product ids that belong to a collection.
pub trait CatalogLookup: Send + Sync {
    fn products_in(&self, collection_id: &str) -> Result<AHashSet<String>, LookupError>;
}

#[derive(Deserialize)]
struct StockRecord {
    variant_id: serde_json::Value,
    location_id: serde_json::Value,
    stock: i64,
}

/// A fixed stock table, mostly useful for tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    levels: AHashMap<(String, String), i64>,
}

impl StaticInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stock(mut self, variant_id: &str, location_id: &str, stock: i64) -> Self {
        self.levels.insert(
            (
                normalize_id(variant_id).to_string(),
                normalize_id(location_id).to_string(),
            ),
            stock,
        );
        self
    }

    /// Parses `[{"variant_id": .., "location_id": .., "stock": n}, ...]`.
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let records: Vec<StockRecord> = serde_json::from_str(json)?;
        let mut inventory = Self::new();
        for record in records {
            let variant = json_id(&record.variant_id)?;
            let location = json_id(&record.location_id)?;
            inventory = inventory.with_stock(&variant, &location, record.stock);
        }
        Ok(inventory)
    }

    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl InventoryLookup for StaticInventory {
    fn stock(&self, variant_id: &str, location_id: &str) -> Result<i64, LookupError> {
        self.levels
            .get(&(variant_id.to_string(), location_id.to_string()))
            .copied()
            .ok_or_else(|| LookupError::StockNotFound {
                variant_id: variant_id.to_string(),
                location_id: location_id.to_string(),
            })
    }
}

/// A fixed collection table, mostly useful for tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    collections: AHashMap<String, AHashSet<String>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection<I, S>(mut self, collection_id: &str, product_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let products = product_ids
            .into_iter()
            .map(|id| normalize_id(id.as_ref()).to_string())
            .collect();
        self.collections
            .insert(normalize_id(collection_id).to_string(), products);
        self
    }

    /// Parses `{"<collection id>": [<product id>, ...], ...}`.
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let raw: AHashMap<String, Vec<serde_json::Value>> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (collection, products) in raw {
            let ids = products.iter().map(json_id).collect::<Result<Vec<_>, _>>()?;
            catalog = catalog.with_collection(&collection, ids);
        }
        Ok(catalog)
    }

    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl CatalogLookup for StaticCatalog {
    fn products_in(&self, collection_id: &str) -> Result<AHashSet<String>, LookupError> {
        self.collections
            .get(collection_id)
            .cloned()
            .ok_or_else(|| LookupError::CollectionNotFound(collection_id.to_string()))
    }
}

fn json_id(value: &serde_json::Value) -> Result<String, Box<dyn std::error::Error>> {
    crate::order::id_from_value(value).ok_or_else(|| format!("invalid id: {}", value).into())
}
