//! HTTP API server with observability for the guest cart.
//!
//! Provides REST endpoints to read and mutate a guest's cart, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod guest;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use cart_store::{CartStore, KeyValueCache};
use catalog::CatalogGateway;
use domain::CartService;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::cart::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<C, K>(state: Arc<AppState<C, K>>, metrics_handle: PrometheusHandle) -> Router
where
    C: CatalogGateway + 'static,
    K: KeyValueCache + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let cart_router = Router::new()
        .route(
            "/cart",
            get(routes::cart::get::<C, K>).post(routes::cart::mutate::<C, K>),
        )
        .route_layer(middleware::from_fn(guest::issue_guest_cookie))
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health::check))
        .merge(cart_router)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over a catalog and a cart cache.
pub fn create_default_state<C, K>(catalog: C, cache: K, cart_ttl: Duration) -> Arc<AppState<C, K>>
where
    C: CatalogGateway + 'static,
    K: KeyValueCache + 'static,
{
    let store = CartStore::new(cache).with_ttl(cart_ttl);
    Arc::new(AppState {
        cart_service: CartService::with_store(catalog, store),
    })
}
