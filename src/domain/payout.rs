use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{OrderId, PayoutId, StoreId};
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
}

/// Net revenue owed to one seller for a batch of settled orders. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: PayoutId,
    pub seller_id: StoreId,
    pub order_ids: Vec<OrderId>,
    pub total_payout: Money,
    pub status: PayoutStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PayoutCreate {
    pub seller_id: StoreId,
    pub order_ids: Vec<OrderId>,
    pub total_payout: Money,
    pub created_at: DateTime<Utc>,
}
