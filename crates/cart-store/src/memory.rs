use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::{CacheError, KeyValueCache, Result};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Default)]
struct InMemoryCacheState {
    entries: HashMap<String, Entry>,
    writes: usize,
    fail_on_read: bool,
    fail_on_write: bool,
}

/// In-memory key-value cache with per-entry expiry, for testing.
///
/// Expiry is measured on tokio's clock, so tests can drive it with
/// `tokio::time::pause` and `advance`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    state: Arc<RwLock<InMemoryCacheState>>,
}

impl InMemoryCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the cache to fail every read.
    pub async fn set_fail_on_read(&self, fail: bool) {
        self.state.write().await.fail_on_read = fail;
    }

    /// Configures the cache to fail every write.
    pub async fn set_fail_on_write(&self, fail: bool) {
        self.state.write().await.fail_on_write = fail;
    }

    /// Stores a raw value, bypassing any encoding.
    pub async fn insert_raw(&self, key: &str, value: impl Into<String>, ttl: Duration) {
        let mut state = self.state.write().await;
        state.entries.insert(
            key.to_string(),
            Entry {
                value: value.into(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Returns how long a live entry has left, or None if absent or expired.
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let state = self.state.read().await;
        state
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at - now)
    }

    /// Returns the number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let state = self.state.read().await;
        state.entries.values().filter(|e| e.is_live(now)).count()
    }

    /// Returns true if no live entries remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns the number of successful writes.
    pub async fn write_count(&self) -> usize {
        self.state.read().await.writes
    }
}

#[async_trait]
impl KeyValueCache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let state = self.state.read().await;

        if state.fail_on_read {
            return Err(CacheError::Unavailable(
                "in-memory cache read failure".to_string(),
            ));
        }

        let now = Instant::now();
        Ok(state
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set_with_expiry(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut state = self.state.write().await;

        if state.fail_on_write {
            return Err(CacheError::Unavailable(
                "in-memory cache write failure".to_string(),
            ));
        }

        let now = Instant::now();
        state.entries.retain(|_, entry| entry.is_live(now));
        state.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        state.writes += 1;

        Ok(())
    }
}
