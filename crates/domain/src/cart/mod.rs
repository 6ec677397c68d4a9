//! Guest cart reconciliation and the facade around it.

mod engine;
mod intent;
mod request;
mod service;
mod view;

pub use engine::{
    HealReport, MutationOutcome, Reconciled, ReconciliationEngine, Snapshots, apply_add,
    apply_remove, apply_update, heal_lines,
};
pub use intent::{MutationIntent, QuantityUpdate};
pub use request::{AddRequest, CartMutationRequest, UpdateRequest};
pub use service::CartService;
pub use view::{CartLineView, CartView};

use thiserror::Error;

/// Errors raised for malformed cart mutation requests.
///
/// These describe a defect in the caller, not in the cart, so they are never
/// corrected on a best-effort basis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Bulk update arrays differ in length.
    #[error(
        "Update arrays differ in length: {product_ids} product ids, {quantities} quantities"
    )]
    LengthMismatch {
        product_ids: usize,
        quantities: usize,
    },

    /// Quantity is negative, too large, or zero where zero has no meaning.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// Product id does not fit the catalog's key range.
    #[error("Invalid product id: {product_id}")]
    InvalidProductId { product_id: i64 },
}
