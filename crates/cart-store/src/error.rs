use thiserror::Error;

/// Errors that can occur when talking to the key-value cache.
///
/// An undecodable cart is not an error at this level; the cart store
/// reports it as "no cart".
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache backend is unreachable or refused the operation.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A cart could not be encoded for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Returns true if the backend could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            CacheError::Unavailable(_)
                | CacheError::Database(
                    sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
                )
        )
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
