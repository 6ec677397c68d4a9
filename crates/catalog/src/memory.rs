use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{CatalogError, CatalogGateway, Product, ProductId, ProductSnapshot, Result};

/// In-memory catalog implementation for testing and local runs.
///
/// Provides the same lookup semantics as the PostgreSQL implementation,
/// plus hooks to mutate the catalog between reconciliations and to
/// simulate an outage.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    unavailable: Arc<AtomicBool>,
    fetches: Arc<AtomicUsize>,
}

impl InMemoryCatalog {
    /// Creates a new empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-populated with products.
    pub async fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let catalog = Self::new();
        for product in products {
            catalog.upsert(product).await;
        }
        catalog
    }

    /// Inserts or replaces a product.
    pub async fn upsert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    /// Deletes a product. Returns true if it existed.
    pub async fn remove(&self, id: ProductId) -> bool {
        self.products.write().await.remove(&id).is_some()
    }

    /// Changes the stock level of an existing product.
    pub async fn set_available_qty(&self, id: ProductId, available_qty: u32) {
        if let Some(product) = self.products.write().await.get_mut(&id) {
            product.available_qty = available_qty;
        }
    }

    /// Marks a product inactive without deleting it.
    pub async fn deactivate(&self, id: ProductId) {
        if let Some(product) = self.products.write().await.get_mut(&id) {
            product.active = false;
        }
    }

    /// Makes every subsequent lookup fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the number of backend round trips served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogGateway for InMemoryCatalog {
    async fn fetch_by_ids(
        &self,
        ids: &HashSet<ProductId>,
    ) -> Result<HashMap<ProductId, ProductSnapshot>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        self.fetches.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable(
                "in-memory catalog switched off".to_string(),
            ));
        }

        let products = self.products.read().await;
        let found = ids
            .iter()
            .filter_map(|id| products.get(id))
            .filter(|product| product.active)
            .map(|product| (product.id, product.snapshot()))
            .collect();

        Ok(found)
    }
}
