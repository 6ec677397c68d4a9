use common::ProductId;
use serde::Deserialize;

use super::{CartError, MutationIntent, QuantityUpdate};

/// Raw, unvalidated cart mutation as received from a client.
///
/// Numbers are taken as `i64` so that out-of-range or negative values reach
/// validation and are reported, instead of failing somewhere in decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CartMutationRequest {
    #[serde(default)]
    pub remove: Option<i64>,
    #[serde(default)]
    pub update: Option<UpdateRequest>,
    #[serde(default)]
    pub add: Option<AddRequest>,
}

/// Parallel arrays of a bulk quantity update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub product_ids: Vec<i64>,
    #[serde(default)]
    pub quantities: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddRequest {
    pub product_id: i64,
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl CartMutationRequest {
    /// A request carrying no intent.
    pub fn read_only() -> Self {
        Self::default()
    }

    /// Selects and validates the intent to apply.
    ///
    /// Precedence is remove, then update, then add. Only the selected intent
    /// is validated; the others are ignored. Returns `Ok(None)` for a request
    /// with no intent at all.
    pub fn into_intent(self) -> Result<Option<MutationIntent>, CartError> {
        if let Some(product_id) = self.remove {
            return Ok(Some(MutationIntent::Remove(product_id_from(product_id)?)));
        }

        if let Some(update) = self.update {
            return update.into_intent().map(Some);
        }

        if let Some(add) = self.add {
            return add.into_intent().map(Some);
        }

        Ok(None)
    }
}

impl UpdateRequest {
    fn into_intent(self) -> Result<MutationIntent, CartError> {
        if self.product_ids.len() != self.quantities.len() {
            return Err(CartError::LengthMismatch {
                product_ids: self.product_ids.len(),
                quantities: self.quantities.len(),
            });
        }

        let updates = self
            .product_ids
            .into_iter()
            .zip(self.quantities)
            .map(|(id, qty)| {
                Ok(QuantityUpdate {
                    product_id: product_id_from(id)?,
                    quantity: quantity_from(qty)?,
                })
            })
            .collect::<Result<Vec<_>, CartError>>()?;

        Ok(MutationIntent::Update(updates))
    }
}

impl AddRequest {
    fn into_intent(self) -> Result<MutationIntent, CartError> {
        let product_id = product_id_from(self.product_id)?;
        let quantity = match self.quantity {
            None => 1,
            Some(0) => return Err(CartError::InvalidQuantity { quantity: 0 }),
            Some(qty) => quantity_from(qty)?,
        };

        Ok(MutationIntent::Add {
            product_id,
            quantity,
        })
    }
}

fn product_id_from(raw: i64) -> Result<ProductId, CartError> {
    i32::try_from(raw)
        .map(ProductId::new)
        .map_err(|_| CartError::InvalidProductId { product_id: raw })
}

fn quantity_from(raw: i64) -> Result<u32, CartError> {
    u32::try_from(raw).map_err(|_| CartError::InvalidQuantity { quantity: raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CartMutationRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_request_is_read_only() {
        assert_eq!(parse("{}").into_intent(), Ok(None));
        assert_eq!(CartMutationRequest::read_only().into_intent(), Ok(None));
    }

    #[test]
    fn remove_wins_over_update() {
        let request = parse(
            r#"{"remove": 3, "update": {"product_ids": [1, 2], "quantities": [1]}}"#,
        );

        assert_eq!(
            request.into_intent(),
            Ok(Some(MutationIntent::remove(3)))
        );
    }

    #[test]
    fn update_wins_over_add() {
        let request = parse(
            r#"{"update": {"product_ids": [1], "quantities": [4]}, "add": {"product_id": 9}}"#,
        );

        assert_eq!(
            request.into_intent(),
            Ok(Some(MutationIntent::Update(vec![QuantityUpdate::new(1, 4)])))
        );
    }

    #[test]
    fn update_length_mismatch_is_malformed() {
        let request = parse(r#"{"update": {"product_ids": [1, 2], "quantities": [1]}}"#);

        assert_eq!(
            request.into_intent(),
            Err(CartError::LengthMismatch {
                product_ids: 2,
                quantities: 1
            })
        );
    }

    #[test]
    fn negative_update_quantity_is_malformed() {
        let request = parse(r#"{"update": {"product_ids": [1], "quantities": [-2]}}"#);

        assert_eq!(
            request.into_intent(),
            Err(CartError::InvalidQuantity { quantity: -2 })
        );
    }

    #[test]
    fn update_quantity_zero_is_allowed() {
        let request = parse(r#"{"update": {"product_ids": [1], "quantities": [0]}}"#);

        assert_eq!(
            request.into_intent(),
            Ok(Some(MutationIntent::Update(vec![QuantityUpdate::new(1, 0)])))
        );
    }

    #[test]
    fn add_quantity_defaults_to_one() {
        let request = parse(r#"{"add": {"product_id": 2}}"#);
        assert_eq!(request.into_intent(), Ok(Some(MutationIntent::add(2))));
    }

    #[test]
    fn add_quantity_zero_is_malformed() {
        let request = parse(r#"{"add": {"product_id": 2, "quantity": 0}}"#);
        assert_eq!(
            request.into_intent(),
            Err(CartError::InvalidQuantity { quantity: 0 })
        );
    }

    #[test]
    fn oversized_values_are_malformed() {
        let request = parse(r#"{"remove": 3000000000}"#);
        assert_eq!(
            request.into_intent(),
            Err(CartError::InvalidProductId {
                product_id: 3_000_000_000
            })
        );

        let request = parse(r#"{"add": {"product_id": 1, "quantity": 5000000000}}"#);
        assert_eq!(
            request.into_intent(),
            Err(CartError::InvalidQuantity {
                quantity: 5_000_000_000
            })
        );
    }

    #[test]
    fn unselected_intents_are_not_validated() {
        let request = parse(r#"{"remove": 1, "add": {"product_id": 1, "quantity": -5}}"#);
        assert_eq!(request.into_intent(), Ok(Some(MutationIntent::remove(1))));
    }
}
