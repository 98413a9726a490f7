use crate::actor_framework::ActorEntity;
use crate::domain::{InventoryCreate, InventoryRecord, ProductId};

use super::actions::{InventoryAction, InventoryActionResult};
use super::error::InventoryError;

impl ActorEntity for InventoryRecord {
    const KIND: &'static str = "Inventory record";
    type Id = ProductId;
    type CreateParams = InventoryCreate;
    type UpdateParams = ();
    type Action = InventoryAction;
    type ActionResult = InventoryActionResult;
    type Error = InventoryError;

    fn id(&self) -> &ProductId {
        &self.product_id
    }

    fn from_create_params(id: ProductId, params: InventoryCreate) -> Result<Self, InventoryError> {
        Ok(Self { product_id: id, quantity: params.quantity, reserved_quantity: 0, sold_quantity: 0 })
    }

    /// Counters only move through actions.
    fn on_update(&mut self, _update: ()) -> Result<(), InventoryError> {
        Ok(())
    }

    fn handle_action(&mut self, action: InventoryAction) -> Result<InventoryActionResult, InventoryError> {
        match action {
            InventoryAction::Reserve(0) | InventoryAction::Restock(0) => Err(InventoryError::InvalidQuantity(0)),
            InventoryAction::Reserve(amount) => {
                if !self.can_fulfill(amount) {
                    return Err(InventoryError::InsufficientStock {
                        product_id: self.product_id.clone(),
                        requested: amount,
                        available: self.available(),
                    });
                }
                self.reserved_quantity += amount;
                Ok(InventoryActionResult::Reserved(self.clone()))
            }
            InventoryAction::Release(amount) => {
                self.reserved_quantity = self.reserved_quantity.saturating_sub(amount);
                Ok(InventoryActionResult::Released(self.clone()))
            }
            InventoryAction::CommitSold(amount) => {
                self.sold_quantity = self
                    .sold_quantity
                    .checked_add(amount)
                    .ok_or_else(|| InventoryError::Overflow(self.product_id.clone()))?;
                Ok(InventoryActionResult::CommittedSold(self.clone()))
            }
            InventoryAction::Restock(amount) => {
                self.quantity = self
                    .quantity
                    .checked_add(amount)
                    .ok_or_else(|| InventoryError::Overflow(self.product_id.clone()))?;
                Ok(InventoryActionResult::Restocked(self.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(quantity: u32) -> InventoryRecord {
        InventoryRecord::from_create_params(ProductId::new("p1"), InventoryCreate { product_id: ProductId::new("p1"), quantity })
            .unwrap()
    }

    #[test]
    fn test_reserve_within_available() {
        let mut r = record(10);
        r.handle_action(InventoryAction::Reserve(10)).unwrap();
        assert_eq!(r.reserved_quantity, 10);
        assert_eq!(r.available(), 0);

        let err = r.handle_action(InventoryAction::Reserve(1)).unwrap_err();
        assert_eq!(
            err,
            InventoryError::InsufficientStock { product_id: ProductId::new("p1"), requested: 1, available: 0 }
        );
        assert_eq!(err.kind(), crate::error::ErrorKind::Conflict);
    }

    #[test]
    fn test_release_floors_at_zero() {
        let mut r = record(5);
        r.handle_action(InventoryAction::Reserve(2)).unwrap();
        r.handle_action(InventoryAction::Release(7)).unwrap();
        assert_eq!(r.reserved_quantity, 0);
    }

    #[test]
    fn test_commit_sold_leaves_quantity_alone() {
        let mut r = record(5);
        r.handle_action(InventoryAction::Reserve(3)).unwrap();
        r.handle_action(InventoryAction::CommitSold(3)).unwrap();
        assert_eq!(r.quantity, 5);
        assert_eq!(r.reserved_quantity, 3);
        assert_eq!(r.sold_quantity, 3);
    }

    #[test]
    fn test_restock_and_zero_quantities() {
        let mut r = record(0);
        assert_eq!(r.handle_action(InventoryAction::Reserve(0)), Err(InventoryError::InvalidQuantity(0)));
        r.handle_action(InventoryAction::Restock(4)).unwrap();
        assert!(r.can_fulfill(4));
    }
}
