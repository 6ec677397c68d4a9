use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Durable representation of a guest cart.
///
/// Only product ids and selected quantities are stored. Names, prices and
/// stock levels are looked up fresh from the catalog on every access, so a
/// cart can never carry a stale price. There is at most one line per
/// product and no line ever holds a quantity of zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: BTreeMap<ProductId, u32>,
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart stamped with the current time.
    pub fn new() -> Self {
        Self {
            lines: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Builds a cart from raw lines, discarding zero quantities.
    pub fn from_lines(lines: impl IntoIterator<Item = (ProductId, u32)>) -> Self {
        let mut cart = Self::new();
        for (product_id, quantity) in lines {
            cart.set_quantity(product_id, quantity);
        }
        cart
    }

    /// When the cart was first materialized.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the selected quantity for a product, if it has a line.
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines.get(&product_id).copied()
    }

    /// Returns true if the cart has a line for the product.
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.lines.contains_key(&product_id)
    }

    /// Returns the distinct product ids referenced by the cart.
    pub fn product_ids(&self) -> HashSet<ProductId> {
        self.lines.keys().copied().collect()
    }

    /// Iterates over `(product_id, quantity)` pairs in product id order.
    pub fn lines(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.lines.iter().map(|(id, qty)| (*id, *qty))
    }

    /// Returns the number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sets a line's quantity. A quantity of zero removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.lines.remove(&product_id);
        } else {
            self.lines.insert(product_id, quantity);
        }
    }

    /// Removes a line. Returns true if it was present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        self.lines.remove(&product_id).is_some()
    }

    /// Adds `quantity` to the product's line, creating it if needed.
    ///
    /// Returns the merged quantity. Merging never creates a second line for
    /// the same product.
    pub fn merge_quantity(&mut self, product_id: ProductId, quantity: u32) -> u32 {
        let merged = self
            .quantity_of(product_id)
            .unwrap_or(0)
            .saturating_add(quantity);
        self.set_quantity(product_id, merged);
        merged
    }

    /// Serializes the cart for the cache.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserializes a cached cart.
    ///
    /// Besides the current format this accepts a bare `{"<id>": qty}` map,
    /// which is materialized with the current time as its creation stamp.
    pub fn decode(raw: &str) -> serde_json::Result<Self> {
        let mut cart = match serde_json::from_str::<Cart>(raw) {
            Ok(cart) => cart,
            Err(err) => match serde_json::from_str::<BTreeMap<ProductId, u32>>(raw) {
                Ok(lines) => Cart {
                    lines,
                    created_at: Utc::now(),
                },
                Err(_) => return Err(err),
            },
        };
        cart.lines.retain(|_, qty| *qty > 0);
        Ok(cart)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: i32) -> ProductId {
        ProductId::new(id)
    }

    #[test]
    fn merge_accumulates_into_one_line() {
        let mut cart = Cart::new();
        assert_eq!(cart.merge_quantity(pid(1), 1), 1);
        assert_eq!(cart.merge_quantity(pid(1), 2), 3);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of(pid(1)), Some(3));
    }

    #[test]
    fn merge_saturates_instead_of_overflowing() {
        let mut cart = Cart::from_lines([(pid(1), u32::MAX - 1)]);
        assert_eq!(cart.merge_quantity(pid(1), 5), u32::MAX);
    }

    #[test]
    fn set_quantity_zero_removes_line() {
        let mut cart = Cart::from_lines([(pid(1), 2), (pid(2), 1)]);
        cart.set_quantity(pid(1), 0);

        assert!(!cart.contains(pid(1)));
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn from_lines_discards_zero_quantities() {
        let cart = Cart::from_lines([(pid(1), 0), (pid(2), 4)]);
        assert_eq!(cart.lines().collect::<Vec<_>>(), vec![(pid(2), 4)]);
    }

    #[test]
    fn remove_reports_presence() {
        let mut cart = Cart::from_lines([(pid(1), 2)]);
        assert!(cart.remove(pid(1)));
        assert!(!cart.remove(pid(1)));
        assert!(cart.is_empty());
    }

    #[test]
    fn encode_decode_preserves_lines_and_timestamp() {
        let cart = Cart::from_lines([(pid(3), 2), (pid(10), 7)]);
        let raw = cart.encode().unwrap();

        assert!(raw.contains(r#""lines":{"3":2,"10":7}"#));
        assert_eq!(Cart::decode(&raw).unwrap(), cart);
    }

    #[test]
    fn decode_accepts_bare_mapping() {
        let cart = Cart::decode(r#"{"5":2,"8":1}"#).unwrap();

        assert_eq!(cart.quantity_of(pid(5)), Some(2));
        assert_eq!(cart.quantity_of(pid(8)), Some(1));
    }

    #[test]
    fn decode_drops_zero_quantity_lines() {
        let cart = Cart::decode(r#"{"5":0,"8":1}"#).unwrap();
        assert_eq!(cart.product_ids(), HashSet::from([pid(8)]));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(Cart::decode("not json").is_err());
        assert!(Cart::decode(r#"{"5":-1}"#).is_err());
        assert!(Cart::decode(r#"{"abc":1}"#).is_err());
        assert!(Cart::decode(r#"[1,2,3]"#).is_err());
    }
}
