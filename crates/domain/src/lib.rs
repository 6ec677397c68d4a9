//! Domain layer for the guest cart system.
//!
//! This crate provides:
//! - Mutation intents and validation of raw cart requests
//! - The reconciliation engine that heals a cached cart against the catalog
//!   and applies client mutations under server-side clamping
//! - The rendering-ready cart view
//! - `CartService`, the facade request handlers call

pub mod cart;
pub mod error;

pub use cart::{
    AddRequest, CartError, CartLineView, CartMutationRequest, CartService, CartView, HealReport,
    MutationIntent, MutationOutcome, QuantityUpdate, Reconciled, ReconciliationEngine, Snapshots,
    UpdateRequest, apply_add, apply_remove, apply_update, heal_lines,
};
pub use error::DomainError;
