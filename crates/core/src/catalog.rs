//! Product catalog boundary
//!
//! Product metadata is owned by an external document store; the engine only
//! reads it, through [`ProductCatalog`], for two purposes: building embedding
//! texts and applying brand/category filters to ranked output. The trait is
//! the seam - persistence internals stay outside this system.
//!
//! [`InMemoryCatalog`] is the bundled implementation for embedded
//! deployments and tests.

use crate::types::ProductId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Product metadata used for filtering and embedding-text construction
///
/// All fields except the id are optional; absent metadata simply weakens the
/// embedding text or exempts the product from metadata filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub product_id: ProductId,
    /// Display name
    pub name: String,
    /// Brand label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Leaf category id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Full category path (e.g. "apparel/shoes/running")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_path: Option<String>,
    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Current price, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    /// ISO currency code for `current_price`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl Product {
    /// Create a product with only id and name set
    pub fn new(product_id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            brand: None,
            description: None,
            category_id: None,
            category_path: None,
            tags: Vec::new(),
            current_price: None,
            currency: None,
        }
    }

    /// Builder: set brand
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: set leaf category id
    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Builder: set category path
    pub fn with_category_path(mut self, path: impl Into<String>) -> Self {
        self.category_path = Some(path.into());
        self
    }

    /// Builder: set tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Builder: set price and currency
    pub fn with_price(mut self, price: f64, currency: impl Into<String>) -> Self {
        self.current_price = Some(price);
        self.currency = Some(currency.into());
        self
    }
}

/// Read-only boundary to the external product store
///
/// Object-safe so engines hold `Arc<dyn ProductCatalog>`.
pub trait ProductCatalog: Send + Sync {
    /// Look up one product by id
    fn find_by_id(&self, id: &ProductId) -> Option<Product>;

    /// Look up many products; missing ids are silently skipped
    fn find_many(&self, ids: &[ProductId]) -> Vec<Product>;
}

/// In-process catalog backed by a `BTreeMap`
///
/// Suitable for embedded deployments and tests. Iteration order is
/// deterministic, matching the rest of the read paths.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<BTreeMap<ProductId, Product>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product
    pub fn upsert(&self, product: Product) {
        self.products
            .write()
            .insert(product.product_id.clone(), product);
    }

    /// Number of products held
    pub fn len(&self) -> usize {
        self.products.read().len()
    }

    /// True when the catalog holds no products
    pub fn is_empty(&self) -> bool {
        self.products.read().is_empty()
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn find_by_id(&self, id: &ProductId) -> Option<Product> {
        self.products.read().get(id).cloned()
    }

    fn find_many(&self, ids: &[ProductId]) -> Vec<Product> {
        let guard = self.products.read();
        ids.iter().filter_map(|id| guard.get(id).cloned()).collect()
    }
}
