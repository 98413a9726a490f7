use crate::domain::InventoryRecord;

/// Stock operations on one product's ledger entry.
///
/// Each action runs inside the inventory actor, so its check and its write
/// happen as one step with respect to every other checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryAction {
    /// Hold stock for an open order.
    ///
    /// # Errors
    /// Fails if the amount exceeds `quantity - reserved_quantity`.
    Reserve(u32),
    /// Give back a hold. `reserved_quantity` never drops below zero.
    Release(u32),
    /// Record a delivered sale. Only `sold_quantity` moves.
    CommitSold(u32),
    /// Receive new stock.
    Restock(u32),
}

/// Results from [`InventoryAction`]; every variant carries the record as it
/// stands after the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryActionResult {
    Reserved(InventoryRecord),
    Released(InventoryRecord),
    CommittedSold(InventoryRecord),
    Restocked(InventoryRecord),
}

impl InventoryActionResult {
    pub fn into_record(self) -> InventoryRecord {
        match self {
            InventoryActionResult::Reserved(record)
            | InventoryActionResult::Released(record)
            | InventoryActionResult::CommittedSold(record)
            | InventoryActionResult::Restocked(record) => record,
        }
    }
}
