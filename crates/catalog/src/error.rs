use thiserror::Error;

use crate::ProductId;

/// Errors that can occur when reading from the catalog.
///
/// A missing product is never an error: absent ids are simply left out of
/// lookup results. Every variant here means the catalog could not answer.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog backend is unreachable.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored product row violates the catalog's own constraints.
    #[error("Invalid catalog record for product {product_id}: {reason}")]
    InvalidRecord {
        product_id: ProductId,
        reason: String,
    },
}

impl CatalogError {
    /// Returns true if the backend could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            CatalogError::Unavailable(_)
                | CatalogError::Database(
                    sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
                )
        )
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
