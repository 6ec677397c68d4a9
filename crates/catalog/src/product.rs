use serde::{Deserialize, Serialize};

use crate::{Money, ProductId};

/// An authoritative product record as held by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub available_qty: u32,
    /// Deactivated products are invisible to lookups, exactly like deleted ones.
    pub active: bool,
}

impl Product {
    /// Creates an active product.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
        available_qty: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            available_qty,
            active: true,
        }
    }

    /// Returns the point-in-time copy used during one reconciliation pass.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            name: self.name.clone(),
            price: self.price,
            available_qty: self.available_qty,
        }
    }
}

/// Point-in-time copy of the catalog fields a cart needs.
///
/// Snapshots live for a single reconciliation pass and are never written
/// into the cart's durable representation, so prices are always fresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub name: String,
    pub price: Money,
    pub available_qty: u32,
}

impl ProductSnapshot {
    /// Returns true if at least one unit can be ordered.
    pub fn in_stock(&self) -> bool {
        self.available_qty > 0
    }

    /// Reduces a requested quantity to what the catalog can supply.
    pub fn clamp(&self, requested: u32) -> u32 {
        requested.min(self.available_qty)
    }
}
