//! Cart facade used by request handlers.
//!
//! Every call runs `load -> self-heal -> [mutation] -> persist` from scratch.
//! Nothing is held in process between requests; the cached cart is the only
//! shared state.
//!
//! # Concurrency
//!
//! Writes are last-writer-wins. Two requests for the same guest that race
//! (two browser tabs, say) both load, reconcile and save, and the later save
//! replaces the earlier one in full. No lock, version check or
//! compare-and-swap guards the cache key, and none should be added without
//! changing which of two racing requests is observed to win.

use std::time::Instant;

use cart_store::{Cart, CartStore, GuestId, KeyValueCache};
use catalog::CatalogGateway;

use super::{CartMutationRequest, CartView, MutationIntent, ReconciliationEngine};
use crate::error::DomainError;

/// Entry point for reading and mutating guest carts.
pub struct CartService<C: CatalogGateway, K: KeyValueCache> {
    engine: ReconciliationEngine<C>,
    store: CartStore<K>,
}

impl<C: CatalogGateway, K: KeyValueCache> CartService<C, K> {
    /// Creates a service over a catalog and a cache, using the default TTL.
    pub fn new(catalog: C, cache: K) -> Self {
        Self::with_store(catalog, CartStore::new(cache))
    }

    /// Creates a service over a preconfigured cart store.
    pub fn with_store(catalog: C, store: CartStore<K>) -> Self {
        Self {
            engine: ReconciliationEngine::new(catalog),
            store,
        }
    }

    pub fn engine(&self) -> &ReconciliationEngine<C> {
        &self.engine
    }

    pub fn store(&self) -> &CartStore<K> {
        &self.store
    }

    /// Returns the guest's reconciled cart.
    ///
    /// Without a guest id, or without a stored cart, this is the empty view
    /// and nothing is written. Otherwise the healed cart is persisted even
    /// when no mutation follows, which also refreshes its TTL.
    #[tracing::instrument(skip(self, guest_id), fields(guest_id = guest_id.map(GuestId::as_str)))]
    pub async fn view(&self, guest_id: Option<&GuestId>) -> Result<CartView, DomainError> {
        let start = Instant::now();
        let result = self.load_and_view(guest_id).await;
        record_duration("view", start);
        result
    }

    /// Applies one intent to the guest's cart and returns the result.
    ///
    /// The cart is persisted exactly once. Remove and update on a guest with
    /// no stored cart do nothing; an add creates the cart only if it yields a
    /// line.
    #[tracing::instrument(
        skip(self, guest_id, intent),
        fields(guest_id = guest_id.map(GuestId::as_str), intent = intent.kind())
    )]
    pub async fn mutate(
        &self,
        guest_id: Option<&GuestId>,
        intent: MutationIntent,
    ) -> Result<CartView, DomainError> {
        let start = Instant::now();
        let result = self.load_and_mutate(guest_id, &intent).await;
        record_duration("mutate", start);
        result
    }

    /// Validates a raw request and dispatches it.
    ///
    /// A malformed request fails before anything is loaded or written.
    pub async fn handle(
        &self,
        guest_id: Option<&GuestId>,
        request: CartMutationRequest,
    ) -> Result<CartView, DomainError> {
        match request.into_intent() {
            Ok(Some(intent)) => self.mutate(guest_id, intent).await,
            Ok(None) => self.view(guest_id).await,
            Err(error) => {
                metrics::counter!("cart_malformed_requests_total").increment(1);
                tracing::warn!(%error, "rejecting malformed cart request");
                Err(error.into())
            }
        }
    }

    async fn load_and_view(&self, guest_id: Option<&GuestId>) -> Result<CartView, DomainError> {
        let Some(guest_id) = guest_id else {
            return Ok(CartView::empty());
        };
        let Some(cart) = self.store.load(guest_id).await? else {
            return Ok(CartView::empty());
        };

        let reconciled = self.engine.self_heal(cart).await?;
        self.store.save(&reconciled.cart, guest_id).await?;

        Ok(CartView::build(&reconciled.cart, &reconciled.snapshots))
    }

    async fn load_and_mutate(
        &self,
        guest_id: Option<&GuestId>,
        intent: &MutationIntent,
    ) -> Result<CartView, DomainError> {
        let Some(guest_id) = guest_id else {
            return Ok(CartView::empty());
        };

        let stored = self.store.load(guest_id).await?;
        let existed = stored.is_some();
        let cart = match stored {
            Some(cart) => cart,
            None if intent.may_create_lines() => Cart::new(),
            None => return Ok(CartView::empty()),
        };

        let (reconciled, _) = self.engine.reconcile(cart, Some(intent)).await?;

        if existed || !reconciled.cart.is_empty() {
            self.store.save(&reconciled.cart, guest_id).await?;
        }

        Ok(CartView::build(&reconciled.cart, &reconciled.snapshots))
    }
}

fn record_duration(operation: &'static str, start: Instant) {
    metrics::histogram!("cart_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_store::{InMemoryCache, ProductId};
    use catalog::{InMemoryCatalog, Money, Product};

    fn guest() -> GuestId {
        GuestId::parse("guest-1").unwrap()
    }

    async fn service() -> CartService<InMemoryCatalog, InMemoryCache> {
        let catalog = InMemoryCatalog::with_products([
            Product::new(1, "Widget", Money::from_cents(999), 10),
            Product::new(2, "Gadget", Money::from_cents(250), 3),
        ])
        .await;
        CartService::new(catalog, InMemoryCache::new())
    }

    #[tokio::test]
    async fn no_guest_means_no_cart() {
        let service = service().await;

        let view = service.mutate(None, MutationIntent::add(1)).await.unwrap();

        assert!(view.is_empty());
        assert_eq!(service.store().cache().write_count().await, 0);
    }

    #[tokio::test]
    async fn view_without_cart_writes_nothing() {
        let service = service().await;

        let view = service.view(Some(&guest())).await.unwrap();

        assert!(view.is_empty());
        assert_eq!(service.store().cache().write_count().await, 0);
    }

    #[tokio::test]
    async fn add_creates_and_persists_cart() {
        let service = service().await;

        let view = service
            .mutate(Some(&guest()), MutationIntent::add(1))
            .await
            .unwrap();

        assert_eq!(view.quantity_of(ProductId::new(1)), Some(1));
        let stored = service.store().load(&guest()).await.unwrap().unwrap();
        assert_eq!(stored.quantity_of(ProductId::new(1)), Some(1));
    }

    #[tokio::test]
    async fn rejected_add_does_not_create_cart() {
        let service = service().await;

        let view = service
            .mutate(Some(&guest()), MutationIntent::add(42))
            .await
            .unwrap();

        assert!(view.is_empty());
        assert_eq!(service.store().cache().write_count().await, 0);
    }

    #[tokio::test]
    async fn remove_without_cart_writes_nothing() {
        let service = service().await;

        service
            .mutate(Some(&guest()), MutationIntent::remove(1))
            .await
            .unwrap();

        assert_eq!(service.store().cache().write_count().await, 0);
    }

    #[tokio::test]
    async fn mutation_persists_once() {
        let service = service().await;
        service
            .store()
            .save(&Cart::from_lines([(ProductId::new(1), 1)]), &guest())
            .await
            .unwrap();

        service
            .mutate(Some(&guest()), MutationIntent::add(2))
            .await
            .unwrap();

        assert_eq!(service.store().cache().write_count().await, 2);
    }

    #[tokio::test]
    async fn malformed_request_touches_nothing() {
        let service = service().await;
        let request: CartMutationRequest = serde_json::from_str(
            r#"{"update": {"product_ids": [1, 2], "quantities": [1]}}"#,
        )
        .unwrap();

        let error = service.handle(Some(&guest()), request).await.unwrap_err();

        assert!(error.is_malformed_request());
        assert_eq!(service.store().cache().write_count().await, 0);
    }

    #[tokio::test]
    async fn read_only_request_is_a_view() {
        let service = service().await;
        service
            .store()
            .save(&Cart::from_lines([(ProductId::new(2), 5)]), &guest())
            .await
            .unwrap();

        let view = service
            .handle(Some(&guest()), CartMutationRequest::read_only())
            .await
            .unwrap();

        assert_eq!(view.quantity_of(ProductId::new(2)), Some(3));
    }
}
