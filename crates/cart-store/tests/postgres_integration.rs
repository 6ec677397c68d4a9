//! PostgreSQL integration tests for the cache-backed cart store.
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p cart-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;
use std::time::Duration;

use cart_store::{Cart, CartStore, GuestId, KeyValueCache, PostgresCache, ProductId};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/002_create_cart_cache_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh cache with its own pool and a cleared table
async fn get_test_cache() -> PostgresCache {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE cart_cache")
        .execute(&pool)
        .await
        .unwrap();

    PostgresCache::new(pool)
}

#[tokio::test]
async fn set_and_get_round_trip() {
    let cache = get_test_cache().await;

    cache
        .set_with_expiry("guest-a", "payload".to_string(), Duration::from_secs(60))
        .await
        .unwrap();

    let value = cache.get("guest-a").await.unwrap();
    assert_eq!(value.as_deref(), Some("payload"));
}

#[tokio::test]
async fn overwrite_replaces_value() {
    let cache = get_test_cache().await;

    cache
        .set_with_expiry("guest-a", "v1".to_string(), Duration::from_secs(60))
        .await
        .unwrap();
    cache
        .set_with_expiry("guest-a", "v2".to_string(), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(cache.get("guest-a").await.unwrap().as_deref(), Some("v2"));
}

#[tokio::test]
async fn expired_entries_are_invisible_and_purgeable() {
    let cache = get_test_cache().await;

    cache
        .set_with_expiry("guest-a", "stale".to_string(), Duration::from_millis(1))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(cache.get("guest-a").await.unwrap().is_none());
    assert_eq!(cache.purge_expired().await.unwrap(), 1);
}

#[tokio::test]
async fn cart_store_over_postgres() {
    let store = CartStore::new(get_test_cache().await);
    let guest = GuestId::parse("guest-b").unwrap();
    let cart = Cart::from_lines([(ProductId::new(1), 2), (ProductId::new(5), 1)]);

    store.save(&cart, &guest).await.unwrap();

    let loaded = store.load(&guest).await.unwrap().unwrap();
    assert_eq!(loaded, cart);
}

#[tokio::test]
async fn corrupt_row_loads_as_no_cart() {
    let cache = get_test_cache().await;
    cache
        .set_with_expiry("guest-c", "][".to_string(), Duration::from_secs(60))
        .await
        .unwrap();

    let store = CartStore::new(cache);
    let guest = GuestId::parse("guest-c").unwrap();
    assert!(store.load(&guest).await.unwrap().is_none());
}
