use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{KeyValueCache, Result};

/// Key-value cache backed by an UNLOGGED PostgreSQL table.
///
/// Expired rows are filtered out on read and overwritten on write;
/// `purge_expired` reclaims space from abandoned carts.
#[derive(Clone)]
pub struct PostgresCache {
    pool: PgPool,
}

impl PostgresCache {
    /// Creates a new PostgreSQL-backed cache.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Deletes every expired entry. Returns the number of rows removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cart_cache WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl KeyValueCache for PostgresCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT value FROM cart_cache WHERE key = $1 AND expires_at > NOW()",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn set_with_expiry(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cart_cache (key, value, expires_at)
            VALUES ($1, $2, NOW() + make_interval(secs => $3))
            ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(ttl.as_secs_f64())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
