use serde::{Deserialize, Serialize};

use super::ids::ProductId;

/// Per-product stock counters.
///
/// Invariant: `reserved_quantity <= quantity`. Available stock for new
/// orders is `quantity - reserved_quantity`. `sold_quantity` is reporting
/// only and never feeds back into availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub product_id: ProductId,
    pub quantity: u32,
    pub reserved_quantity: u32,
    pub sold_quantity: u32,
}

impl InventoryRecord {
    pub fn available(&self) -> u32 {
        self.quantity.saturating_sub(self.reserved_quantity)
    }

    pub fn can_fulfill(&self, quantity: u32) -> bool {
        quantity <= self.available()
    }
}

/// Opens the ledger entry for a product.
#[derive(Debug, Clone)]
pub struct InventoryCreate {
    pub product_id: ProductId,
    pub quantity: u32,
}
