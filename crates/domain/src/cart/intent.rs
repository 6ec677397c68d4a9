use common::ProductId;

use super::CartError;

/// One `(product, requested quantity)` pair of a bulk update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityUpdate {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl QuantityUpdate {
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A validated client mutation. At most one is applied per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationIntent {
    /// Delete the product's line if present.
    Remove(ProductId),
    /// Set quantities of lines already in the cart. Never adds lines.
    Update(Vec<QuantityUpdate>),
    /// Merge `quantity` units of the product into the cart.
    Add {
        product_id: ProductId,
        quantity: u32,
    },
}

impl MutationIntent {
    pub fn remove(product_id: impl Into<ProductId>) -> Self {
        MutationIntent::Remove(product_id.into())
    }

    /// Adds a single unit.
    pub fn add(product_id: impl Into<ProductId>) -> Self {
        Self::add_quantity(product_id, 1)
    }

    pub fn add_quantity(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        MutationIntent::Add {
            product_id: product_id.into(),
            quantity,
        }
    }

    /// Pairs parallel id and quantity arrays into a bulk update.
    ///
    /// Unequal lengths are rejected rather than truncated.
    pub fn update(product_ids: &[ProductId], quantities: &[u32]) -> Result<Self, CartError> {
        if product_ids.len() != quantities.len() {
            return Err(CartError::LengthMismatch {
                product_ids: product_ids.len(),
                quantities: quantities.len(),
            });
        }

        Ok(MutationIntent::Update(
            product_ids
                .iter()
                .zip(quantities)
                .map(|(id, qty)| QuantityUpdate::new(*id, *qty))
                .collect(),
        ))
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MutationIntent::Remove(_) => "remove",
            MutationIntent::Update(_) => "update",
            MutationIntent::Add { .. } => "add",
        }
    }

    /// Returns true if applying the intent can create a line.
    pub fn may_create_lines(&self) -> bool {
        matches!(self, MutationIntent::Add { .. })
    }
}
