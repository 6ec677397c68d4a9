//! Reconciliation of cached carts against the catalog.
//!
//! Every access runs two phases in a fixed order. Phase A (self-heal) drops
//! lines whose product is gone or sold out and clamps the rest to stock.
//! Phase B applies at most one client mutation against the healed cart,
//! reusing the snapshots Phase A fetched. The pure helpers in this module do
//! the cart arithmetic; `ReconciliationEngine` adds the catalog lookups.

use std::collections::{HashMap, HashSet};

use cart_store::Cart;
use catalog::{CatalogGateway, ProductSnapshot};
use common::ProductId;

use super::{MutationIntent, QuantityUpdate};
use crate::error::DomainError;

/// Catalog data for one reconciliation pass, keyed by product.
pub type Snapshots = HashMap<ProductId, ProductSnapshot>;

/// What self-heal changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealReport {
    /// Lines dropped because the product no longer resolves.
    pub missing: Vec<ProductId>,
    /// Lines dropped because the product has no stock left.
    pub sold_out: Vec<ProductId>,
    /// Lines whose quantity was reduced to the available stock.
    pub clamped: Vec<ProductId>,
}

impl HealReport {
    /// Returns true if self-heal left the cart unchanged.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.sold_out.is_empty() && self.clamped.is_empty()
    }

    /// Number of lines removed.
    pub fn dropped(&self) -> usize {
        self.missing.len() + self.sold_out.len()
    }
}

/// Result of applying one intent to a healed cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Removed { was_present: bool },
    Updated { set: usize, dropped: usize, skipped: usize },
    /// The line now holds `quantity` units after merging and clamping.
    Added { quantity: u32 },
    /// The product does not exist or is out of stock. Nothing changed.
    AddRejected,
}

/// A healed cart together with the snapshots it was healed against.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub cart: Cart,
    pub snapshots: Snapshots,
    pub report: HealReport,
}

/// Drops phantom and sold-out lines and clamps the rest to stock.
pub fn heal_lines(cart: &mut Cart, snapshots: &Snapshots) -> HealReport {
    let mut report = HealReport::default();
    let lines: Vec<_> = cart.lines().collect();

    for (product_id, quantity) in lines {
        let Some(snapshot) = snapshots.get(&product_id) else {
            cart.remove(product_id);
            report.missing.push(product_id);
            continue;
        };

        let clamped = snapshot.clamp(quantity);
        if clamped == 0 {
            cart.remove(product_id);
            report.sold_out.push(product_id);
        } else if clamped < quantity {
            cart.set_quantity(product_id, clamped);
            report.clamped.push(product_id);
        }
    }

    report
}

/// Removes a line. Removing a product that is not in the cart is a no-op.
pub fn apply_remove(cart: &mut Cart, product_id: ProductId) -> MutationOutcome {
    MutationOutcome::Removed {
        was_present: cart.remove(product_id),
    }
}

/// Sets quantities of existing lines, clamped to stock.
///
/// Ids not already in the cart are skipped. A quantity of zero or a product
/// missing from `snapshots` drops the line.
pub fn apply_update(
    cart: &mut Cart,
    updates: &[QuantityUpdate],
    snapshots: &Snapshots,
) -> MutationOutcome {
    let (mut set, mut dropped, mut skipped) = (0, 0, 0);

    for update in updates {
        if !cart.contains(update.product_id) {
            skipped += 1;
            continue;
        }

        let target = match snapshots.get(&update.product_id) {
            Some(snapshot) => snapshot.clamp(update.quantity),
            None => 0,
        };

        cart.set_quantity(update.product_id, target);
        if target == 0 {
            dropped += 1;
        } else {
            set += 1;
        }
    }

    MutationOutcome::Updated {
        set,
        dropped,
        skipped,
    }
}

/// Merges `quantity` units into the product's line, clamped to stock.
///
/// Unknown and out-of-stock products are silently rejected.
pub fn apply_add(
    cart: &mut Cart,
    product_id: ProductId,
    quantity: u32,
    snapshots: &Snapshots,
) -> MutationOutcome {
    let Some(snapshot) = snapshots.get(&product_id).filter(|s| s.in_stock()) else {
        return MutationOutcome::AddRejected;
    };

    let merged = cart
        .quantity_of(product_id)
        .unwrap_or(0)
        .saturating_add(quantity);
    let quantity = snapshot.clamp(merged);
    cart.set_quantity(product_id, quantity);

    MutationOutcome::Added { quantity }
}

/// Runs both reconciliation phases against a catalog.
///
/// Each phase costs at most one bulk catalog call regardless of cart size.
/// Catalog failures are returned before any change to the cart is made, so
/// an outage can never be mistaken for every product having been removed.
#[derive(Debug, Clone)]
pub struct ReconciliationEngine<C: CatalogGateway> {
    catalog: C,
}

impl<C: CatalogGateway> ReconciliationEngine<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Phase A: heals the cart against fresh catalog data.
    #[tracing::instrument(skip(self, cart), fields(lines = cart.line_count()))]
    pub async fn self_heal(&self, mut cart: Cart) -> Result<Reconciled, DomainError> {
        let snapshots = self.catalog.fetch_by_ids(&cart.product_ids()).await?;
        let report = heal_lines(&mut cart, &snapshots);

        metrics::counter!("cart_reconciliations_total").increment(1);
        if !report.is_clean() {
            metrics::counter!("cart_lines_dropped_total", "reason" => "missing")
                .increment(report.missing.len() as u64);
            metrics::counter!("cart_lines_dropped_total", "reason" => "sold_out")
                .increment(report.sold_out.len() as u64);
            metrics::counter!("cart_lines_clamped_total").increment(report.clamped.len() as u64);
            tracing::debug!(
                missing = ?report.missing,
                sold_out = ?report.sold_out,
                clamped = ?report.clamped,
                "healed cart"
            );
        }

        Ok(Reconciled {
            cart,
            snapshots,
            report,
        })
    }

    /// Phase B: applies one intent to an already healed cart.
    ///
    /// Only products without a snapshot from Phase A are looked up, in a
    /// single bulk call.
    #[tracing::instrument(skip(self, reconciled), fields(intent = intent.kind()))]
    pub async fn apply(
        &self,
        reconciled: &mut Reconciled,
        intent: &MutationIntent,
    ) -> Result<MutationOutcome, DomainError> {
        let unresolved = unresolved_ids(reconciled, intent);
        if !unresolved.is_empty() {
            let fetched = self.catalog.fetch_by_ids(&unresolved).await?;
            reconciled.snapshots.extend(fetched);
        }

        let Reconciled {
            cart, snapshots, ..
        } = reconciled;
        let outcome = match intent {
            MutationIntent::Remove(product_id) => apply_remove(cart, *product_id),
            MutationIntent::Update(updates) => apply_update(cart, updates, snapshots),
            MutationIntent::Add {
                product_id,
                quantity,
            } => apply_add(cart, *product_id, *quantity, snapshots),
        };

        metrics::counter!("cart_mutations_total", "intent" => intent.kind()).increment(1);
        tracing::debug!(?outcome, "applied cart mutation");

        Ok(outcome)
    }

    /// Runs Phase A and then Phase B if an intent is given.
    pub async fn reconcile(
        &self,
        cart: Cart,
        intent: Option<&MutationIntent>,
    ) -> Result<(Reconciled, Option<MutationOutcome>), DomainError> {
        let mut reconciled = self.self_heal(cart).await?;
        let outcome = match intent {
            Some(intent) => Some(self.apply(&mut reconciled, intent).await?),
            None => None,
        };
        Ok((reconciled, outcome))
    }
}

/// Ids the intent needs catalog data for that the pass has not fetched yet.
fn unresolved_ids(reconciled: &Reconciled, intent: &MutationIntent) -> HashSet<ProductId> {
    let needs = |id: &ProductId| !reconciled.snapshots.contains_key(id);

    match intent {
        MutationIntent::Remove(_) => HashSet::new(),
        MutationIntent::Update(updates) => updates
            .iter()
            .map(|u| u.product_id)
            .filter(|id| reconciled.cart.contains(*id) && needs(id))
            .collect(),
        MutationIntent::Add { product_id, .. } => {
            if needs(product_id) {
                HashSet::from([*product_id])
            } else {
                HashSet::new()
            }
        }
    }
}
