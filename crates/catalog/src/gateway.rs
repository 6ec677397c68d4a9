use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::{ProductId, ProductSnapshot, Result};

/// Read-only bulk access to the product catalog.
///
/// The catalog is the single source of truth for price and stock.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Fetches snapshots for a set of candidate product ids.
    ///
    /// The result contains only ids that currently exist and are active.
    /// Ids left out of the map are "no longer available", which is normal
    /// input for reconciliation. Backend failures are returned as errors and
    /// must never be read as "every product was removed".
    async fn fetch_by_ids(
        &self,
        ids: &HashSet<ProductId>,
    ) -> Result<HashMap<ProductId, ProductSnapshot>>;
}

/// Extension trait providing convenience lookups.
#[async_trait]
pub trait CatalogGatewayExt: CatalogGateway {
    /// Fetches a single product, or None if it is absent or inactive.
    async fn fetch_one(&self, id: ProductId) -> Result<Option<ProductSnapshot>> {
        let ids = HashSet::from([id]);
        let mut found = self.fetch_by_ids(&ids).await?;
        Ok(found.remove(&id))
    }
}

// Blanket implementation for all CatalogGateway implementations
impl<T: CatalogGateway + ?Sized> CatalogGatewayExt for T {}
