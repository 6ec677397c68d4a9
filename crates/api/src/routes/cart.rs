//! Guest cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use cart_store::KeyValueCache;
use catalog::CatalogGateway;
use domain::{CartLineView, CartMutationRequest, CartService, CartView};
use serde::Serialize;

use crate::error::ApiError;
use crate::guest::MaybeGuest;

/// Shared application state accessible from all handlers.
pub struct AppState<C: CatalogGateway, K: KeyValueCache> {
    pub cart_service: CartService<C, K>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub lines: Vec<CartLineResponse>,
    pub item_count: u64,
    pub subtotal_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub product_id: i32,
    pub name: String,
    pub price_cents: i64,
    pub selected_qty: u32,
    pub line_total_cents: i64,
}

impl From<CartLineView> for CartLineResponse {
    fn from(line: CartLineView) -> Self {
        Self {
            product_id: line.product_id.as_i32(),
            name: line.name,
            price_cents: line.price.cents(),
            selected_qty: line.selected_qty,
            line_total_cents: line.line_total.cents(),
        }
    }
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        let item_count = view.item_count();
        Self {
            lines: view.lines.into_iter().map(Into::into).collect(),
            item_count,
            subtotal_cents: view.subtotal.cents(),
        }
    }
}

// -- Handlers --

/// GET /cart: the guest's reconciled cart.
#[tracing::instrument(skip(state))]
pub async fn get<C, K>(
    State(state): State<Arc<AppState<C, K>>>,
    guest: MaybeGuest,
) -> Result<Json<CartResponse>, ApiError>
where
    C: CatalogGateway + 'static,
    K: KeyValueCache + 'static,
{
    let view = state.cart_service.view(guest.guest_id()).await?;
    Ok(Json(view.into()))
}

/// POST /cart: apply one of `remove`, `update` or `add`, then return the cart.
#[tracing::instrument(skip(state, payload))]
pub async fn mutate<C, K>(
    State(state): State<Arc<AppState<C, K>>>,
    guest: MaybeGuest,
    payload: Result<Json<CartMutationRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, ApiError>
where
    C: CatalogGateway + 'static,
    K: KeyValueCache + 'static,
{
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let view = state
        .cart_service
        .handle(guest.guest_id(), request)
        .await?;
    Ok(Json(view.into()))
}
