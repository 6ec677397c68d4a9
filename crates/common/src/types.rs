use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a product in the catalog.
///
/// Wraps the catalog's integer key so product ids cannot be mixed up
/// with quantities or other integers. Serializes as a bare integer, which
/// also makes it usable as a JSON map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i32);

impl ProductId {
    /// Creates a product ID from the catalog's integer key.
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the underlying integer key.
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<ProductId> for i32 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

/// Opaque per-guest identifier, used as the cache key for a cart.
///
/// Guests are anonymous; the identifier is independent of any
/// authentication state and carries no meaning of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(String);

impl GuestId {
    /// Parses a guest token, rejecting empty or whitespace-only values.
    pub fn parse(token: &str) -> Option<Self> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Generates a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GuestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for GuestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn product_id_preserves_value() {
        let id = ProductId::new(42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(i32::from(id), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn product_id_as_json_map_key() {
        let mut lines = BTreeMap::new();
        lines.insert(ProductId::new(7), 3u32);
        lines.insert(ProductId::new(-1), 1u32);

        let json = serde_json::to_string(&lines).unwrap();
        assert_eq!(json, r#"{"-1":1,"7":3}"#);

        let decoded: BTreeMap<ProductId, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, lines);
    }

    #[test]
    fn guest_id_rejects_blank_tokens() {
        assert!(GuestId::parse("").is_none());
        assert!(GuestId::parse("   ").is_none());
    }

    #[test]
    fn guest_id_trims_surrounding_whitespace() {
        let id = GuestId::parse("  abc-123 ").unwrap();
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn guest_id_generate_creates_unique_tokens() {
        let a = GuestId::generate();
        let b = GuestId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }
}
