use chrono::{DateTime, Utc};

use crate::domain::{Order, OrderStatus};

/// Mutations on a persisted order. Each is validated and applied inside the
/// order actor, so two racing requests can never both move the same order.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    /// Move forward along the status table.
    Transition { to: OrderStatus, at: DateTime<Utc> },
    /// Cancel a pending or confirmed order.
    Cancel { note: Option<String>, at: DateTime<Utc> },
    /// Claim the order for a payout. Fails if already claimed.
    MarkSettled { at: DateTime<Utc> },
    /// Undo a claim whose payout could not be written.
    RevertSettled { at: DateTime<Utc> },
}

/// Results from [`OrderAction`] - variants match 1:1 with the actions.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    Transitioned { from: OrderStatus, order: Order },
    Cancelled { from: OrderStatus, order: Order },
    Settled(Order),
    SettlementReverted(Order),
}
