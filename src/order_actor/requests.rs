//! Typed request bodies for the order operations. Unknown fields are
//! rejected at deserialization, and `validate` runs before any lookup.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{Address, CouponId, Money, OrderId, OrderStatus, PaymentMethodId, ProductId, StoreId, UserId};

use super::error::OrderError;

/// Parse a request body, mapping malformed or unknown-shape input to a
/// validation error.
pub fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, OrderError> {
    serde_json::from_str(body).map_err(|e| OrderError::ValidationError(format!("Malformed request: {}", e)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LineItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
    #[serde(default)]
    pub discount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOrderRequest {
    pub buyer_id: UserId,
    pub seller_id: StoreId,
    pub payment_id: PaymentMethodId,
    #[serde(default)]
    pub coupon_id: Option<CouponId>,
    pub line_items: Vec<LineItemRequest>,
    pub address: Address,
    #[serde(default)]
    pub shipping_fee: Option<Money>,
}

impl CreateOrderRequest {
    pub fn from_json(body: &str) -> Result<Self, OrderError> {
        from_json(body)
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        require_id("buyerId", self.buyer_id.is_blank())?;
        require_id("sellerId", self.seller_id.is_blank())?;
        require_id("paymentId", self.payment_id.is_blank())?;
        if let Some(coupon_id) = &self.coupon_id {
            require_id("couponId", coupon_id.is_blank())?;
        }

        if self.line_items.is_empty() {
            return invalid("Order must contain at least one line item");
        }
        let mut seen = HashSet::new();
        for line in &self.line_items {
            require_id("productId", line.product_id.is_blank())?;
            if !seen.insert(&line.product_id) {
                return invalid(format!("Product {} appears more than once", line.product_id));
            }
            if line.quantity == 0 {
                return invalid(format!("Quantity for {} must be positive", line.product_id));
            }
            if line.price.is_negative() {
                return invalid(format!("Price for {} must not be negative", line.product_id));
            }
            if !(0.0..=1.0).contains(&line.discount) {
                return invalid(format!("Discount for {} must be between 0 and 1", line.product_id));
            }
        }

        if self.shipping_fee.is_some_and(|fee| fee.is_negative()) {
            return invalid("Shipping fee must not be negative");
        }
        if self.address.street.trim().is_empty() || self.address.city.trim().is_empty() {
            return invalid("Address requires a street and a city");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetStatusRequest {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

impl SetStatusRequest {
    pub fn from_json(body: &str) -> Result<Self, OrderError> {
        let request: Self = from_json(body)?;
        require_id("orderId", request.order_id.is_blank())?;
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CancelOrderRequest {
    pub order_id: OrderId,
    #[serde(default)]
    pub note: Option<String>,
}

impl CancelOrderRequest {
    pub fn from_json(body: &str) -> Result<Self, OrderError> {
        let request: Self = from_json(body)?;
        require_id("orderId", request.order_id.is_blank())?;
        Ok(request)
    }
}

fn require_id(field: &str, blank: bool) -> Result<(), OrderError> {
    if blank {
        return invalid(format!("{} is required", field));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> Result<(), OrderError> {
    Err(OrderError::ValidationError(message.into()))
}
