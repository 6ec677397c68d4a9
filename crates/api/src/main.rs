//! API server entry point.

use std::time::Duration;

use api::config::Config;
use cart_store::{InMemoryCache, PostgresCache};
use catalog::{InMemoryCatalog, Money, PostgresCatalog, Product};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn describe_metrics() {
    metrics::describe_counter!(
        "cart_reconciliations_total",
        "Self-heal passes run against the catalog"
    );
    metrics::describe_counter!(
        "cart_lines_dropped_total",
        "Cart lines dropped during self-heal, by reason"
    );
    metrics::describe_counter!(
        "cart_lines_clamped_total",
        "Cart lines reduced to available stock during self-heal"
    );
    metrics::describe_counter!("cart_mutations_total", "Cart mutations applied, by intent");
    metrics::describe_counter!(
        "cart_malformed_requests_total",
        "Cart mutation requests rejected as malformed"
    );
    metrics::describe_counter!(
        "cart_store_corrupt_values_total",
        "Cached carts discarded because they could not be decoded"
    );
    metrics::describe_histogram!(
        "cart_request_duration_seconds",
        metrics::Unit::Seconds,
        "Cart request latency, by operation"
    );
}

/// Products served when no database is configured.
fn demo_products() -> Vec<Product> {
    vec![
        Product::new(1, "Espresso Beans 1kg", Money::from_cents(2450), 25),
        Product::new(2, "Ceramic Mug", Money::from_cents(999), 10),
        Product::new(3, "Pour-over Kettle", Money::from_cents(5900), 3),
        Product::new(4, "Paper Filters (100)", Money::from_cents(650), 0),
    ]
}

async fn build_app(config: &Config, metrics_handle: PrometheusHandle) -> axum::Router {
    let Some(database_url) = &config.database_url else {
        tracing::info!("DATABASE_URL not set, using in-memory catalog and cart cache");
        let catalog = InMemoryCatalog::with_products(demo_products()).await;
        let state = api::create_default_state(catalog, InMemoryCache::new(), config.cart_ttl);
        return api::create_app(state, metrics_handle);
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .expect("failed to connect to database");

    let catalog = PostgresCatalog::new(pool.clone());
    catalog
        .run_migrations()
        .await
        .expect("failed to run migrations");
    let cache = PostgresCache::new(pool);

    let purger = cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match purger.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "purged expired carts"),
                Err(error) => tracing::warn!(%error, "failed to purge expired carts"),
            }
        }
    });

    let state = api::create_default_state(catalog, cache, config.cart_ttl);
    api::create_app(state, metrics_handle)
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    describe_metrics();

    // 3. Choose backends and build the application
    let app = build_app(&config, metrics_handle).await;

    // 4. Start server
    let addr = config.addr();
    tracing::info!(%addr, cart_ttl_secs = config.cart_ttl.as_secs(), "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
