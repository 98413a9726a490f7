use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{OrderId, ShipmentId, StoreId};
use super::money::Money;
use super::order::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::Delivered => "delivered",
            ShipmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ShipmentStatus::Delivered | ShipmentStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentPaymentStatus {
    Unpaid,
    Paid,
}

/// Pickup side of a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerInfo {
    pub store_id: StoreId,
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// One hop in the shipment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentLog {
    pub status: ShipmentStatus,
    pub note: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryShipment {
    pub id: ShipmentId,
    pub order_id: OrderId,
    pub address: Address,
    pub seller: SellerInfo,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub cod_amount: Money,
    pub payment_status: ShipmentPaymentStatus,
    pub status: ShipmentStatus,
    pub logs: Vec<ShipmentLog>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewShipment {
    pub order_id: OrderId,
    pub address: Address,
    pub seller: SellerInfo,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub cod_amount: Money,
    pub payment_status: ShipmentPaymentStatus,
    pub requested_at: DateTime<Utc>,
}
