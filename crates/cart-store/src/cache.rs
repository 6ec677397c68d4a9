use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Minimal key-value cache contract the cart store relies on.
///
/// Values are opaque strings. An entry whose expiry has passed must be
/// reported exactly like a missing entry.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Reads the live value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value and
    /// resetting its time-to-live to `ttl`.
    async fn set_with_expiry(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}
