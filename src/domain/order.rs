use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::PaymentKind;
use super::ids::{CouponId, OrderId, PaymentMethodId, ProductId, StoreId, UserId};
use super::money::Money;

/// Order lifecycle. Declaration order is lifecycle order, which is also the
/// iteration order of [`StatusTimestamps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Forward transitions reachable through a status change.
    /// Cancellation is a separate path, see [`OrderStatus::is_cancellable`].
    pub fn allowed_targets(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed],
            OrderStatus::Confirmed => &[OrderStatus::Shipped],
            OrderStatus::Shipped => &[OrderStatus::Delivered],
            OrderStatus::Delivered => &[OrderStatus::Completed],
            OrderStatus::Completed | OrderStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    /// Fulfilled far enough for the seller to be paid.
    pub fn is_settlement_eligible(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamp per status the order has ever reached.
pub type StatusTimestamps = BTreeMap<OrderStatus, DateTime<Utc>>;

/// Line item with price and discount snapshotted at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
    /// Fraction off the unit price, `0.0..=1.0`.
    pub discount: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub recipient_name: Option<String>,
    pub phone: Option<String>,
    pub street: String,
    pub district: Option<String>,
    pub city: String,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.district {
            Some(district) => write!(f, "{}, {}, {}", self.street, district, self.city),
            None => write!(f, "{}, {}", self.street, self.city),
        }
    }
}

/// Platform-retained amounts, subtracted from the total to get seller revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Fees {
    pub commission: Money,
    pub transaction: Money,
    pub service: Money,
}

impl Fees {
    pub fn sum(&self) -> Money {
        self.commission + self.transaction + self.service
    }
}

/// Represents a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub seller_id: StoreId,
    pub payment_id: PaymentMethodId,
    pub payment_kind: PaymentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_id: Option<CouponId>,
    pub line_items: Vec<OrderLineItem>,
    pub address: Address,
    pub subtotal: Money,
    pub coupon_value: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub fees: Fees,
    pub status: OrderStatus,
    pub status_timestamps: StatusTimestamps,
    pub settled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// What the seller is owed once the order settles.
    pub fn net_revenue(&self) -> Money {
        self.total - self.fees.sum()
    }
}

/// Payload for persisting a fully priced order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub buyer_id: UserId,
    pub seller_id: StoreId,
    pub payment_id: PaymentMethodId,
    pub payment_kind: PaymentKind,
    pub coupon_id: Option<CouponId>,
    pub line_items: Vec<OrderLineItem>,
    pub address: Address,
    pub subtotal: Money,
    pub coupon_value: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub fees: Fees,
    pub placed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use OrderStatus::*;
        let allowed = [(Pending, Confirmed), (Confirmed, Shipped), (Shipped, Delivered), (Delivered, Completed)];
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert_eq!(from.can_transition_to(to), allowed.contains(&(from, to)), "{} -> {}", from, to);
            }
        }
        assert!(Completed.allowed_targets().is_empty());
        assert!(Cancelled.allowed_targets().is_empty());
    }

    #[test]
    fn test_status_predicates() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Confirmed.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Delivered.is_settlement_eligible());
        assert!(!OrderStatus::Shipped.is_settlement_eligible());
    }
}
