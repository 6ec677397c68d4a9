use std::time::Duration;

use crate::{Cart, GuestId, KeyValueCache, Result};

/// Time-to-live of a cached cart, refreshed on every write.
pub const CART_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Loads and saves carts in a key-value cache, keyed by guest id.
///
/// The cache is an optimization, not a source of truth: a stored value
/// that cannot be decoded is reported as "no cart" instead of failing the
/// request. Transport failures are still returned as errors.
#[derive(Debug, Clone)]
pub struct CartStore<K: KeyValueCache> {
    cache: K,
    ttl: Duration,
}

impl<K: KeyValueCache> CartStore<K> {
    /// Creates a cart store using the default two-hour TTL.
    pub fn new(cache: K) -> Self {
        Self {
            cache,
            ttl: CART_TTL,
        }
    }

    /// Overrides the time-to-live applied on save.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a reference to the underlying cache.
    pub fn cache(&self) -> &K {
        &self.cache
    }

    /// Loads the guest's cart.
    ///
    /// Returns None if nothing is stored or the stored value is corrupt.
    #[tracing::instrument(skip(self), fields(guest_id = %guest_id))]
    pub async fn load(&self, guest_id: &GuestId) -> Result<Option<Cart>> {
        let Some(raw) = self.cache.get(guest_id.as_str()).await? else {
            return Ok(None);
        };

        match Cart::decode(&raw) {
            Ok(cart) => Ok(Some(cart)),
            Err(error) => {
                metrics::counter!("cart_store_corrupt_values_total").increment(1);
                tracing::warn!(%error, "discarding undecodable cached cart");
                Ok(None)
            }
        }
    }

    /// Writes the cart and resets its time-to-live.
    #[tracing::instrument(skip(self, cart), fields(guest_id = %guest_id, lines = cart.line_count()))]
    pub async fn save(&self, cart: &Cart, guest_id: &GuestId) -> Result<()> {
        let raw = cart.encode()?;
        self.cache
            .set_with_expiry(guest_id.as_str(), raw, self.ttl)
            .await
    }
}
