use serde::{Deserialize, Serialize};

use super::ids::{PaymentMethodId, StoreId, UserId};

/// Represents a registered buyer (or store owner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Payload for creating a new user.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// How often a store's unsettled revenue is batched into a payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentCycle {
    Weekly,
    Monthly,
}

impl PaymentCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentCycle::Weekly => "weekly",
            PaymentCycle::Monthly => "monthly",
        }
    }
}

/// A seller. Only the fields the fulfillment core reads are modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub owner_id: UserId,
    pub phone: String,
    pub address: String,
    pub payment_cycle: PaymentCycle,
}

#[derive(Debug, Clone)]
pub struct StoreCreate {
    pub name: String,
    pub owner_id: UserId,
    pub phone: String,
    pub address: String,
    pub payment_cycle: PaymentCycle,
}

#[derive(Debug, Clone)]
pub struct StorePatch {
    pub payment_cycle: Option<PaymentCycle>,
}

/// Payment is a label only; no gateway sits behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    CashOnDelivery,
    Prepaid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub kind: PaymentKind,
}

#[derive(Debug, Clone)]
pub struct PaymentMethodCreate {
    pub name: String,
    pub kind: PaymentKind,
}
