//! Domain error types.

use cart_store::CacheError;
use catalog::CatalogError;
use thiserror::Error;

use crate::cart::CartError;

/// Errors that can occur during cart operations.
///
/// Catalog drift (deleted products, reduced stock) is never an error; it is
/// corrected by reconciliation. Only infrastructure failures and malformed
/// caller input surface here.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The catalog could not be read. Reconciliation did not run.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The cart cache could not be read or written.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// The mutation request was malformed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
}

impl DomainError {
    /// Returns true if the caller sent a malformed request.
    pub fn is_malformed_request(&self) -> bool {
        matches!(self, DomainError::Cart(_))
    }

    /// Returns true if a backend could not be reached.
    pub fn is_unavailable(&self) -> bool {
        match self {
            DomainError::Catalog(err) => err.is_unavailable(),
            DomainError::Cache(err) => err.is_unavailable(),
            DomainError::Cart(_) => false,
        }
    }
}
