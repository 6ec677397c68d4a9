use cart_store::Cart;
use common::{Money, ProductId};
use serde::Serialize;

use super::Snapshots;

/// One cart line joined with current catalog name and price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub selected_qty: u32,
    pub line_total: Money,
}

/// Rendering-ready cart, ordered by product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: Money,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            subtotal: Money::zero(),
        }
    }

    /// Joins a reconciled cart with the snapshots it was reconciled against.
    ///
    /// Lines without a snapshot are left out. After reconciliation there are
    /// none, since such lines have already been dropped.
    pub fn build(cart: &Cart, snapshots: &Snapshots) -> Self {
        let lines: Vec<CartLineView> = cart
            .lines()
            .filter_map(|(product_id, selected_qty)| {
                let snapshot = snapshots.get(&product_id)?;
                Some(CartLineView {
                    product_id,
                    name: snapshot.name.clone(),
                    price: snapshot.price,
                    selected_qty,
                    line_total: snapshot.price.multiply(selected_qty),
                })
            })
            .collect();
        let subtotal = lines.iter().map(|line| line.line_total).sum();

        Self { lines, subtotal }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.selected_qty)).sum()
    }

    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
            .map(|line| line.selected_qty)
    }
}

impl Default for CartView {
    fn default() -> Self {
        Self::empty()
    }
}
