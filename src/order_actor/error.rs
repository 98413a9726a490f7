use std::fmt;

use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{CouponId, Money, OrderId, OrderStatus, ProductId};
use crate::error::ErrorKind;

/// Where in an order workflow an internal failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStep {
    Lookup,
    Reserve,
    Persist,
    Shipment,
    Transition,
    Load,
}

impl fmt::Display for OrderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStep::Lookup => "lookup",
            OrderStep::Reserve => "reserve",
            OrderStep::Persist => "persist",
            OrderStep::Shipment => "shipment",
            OrderStep::Transition => "transition",
            OrderStep::Load => "load",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("Product is not active: {0}")]
    InactiveProduct(ProductId),
    #[error("Price of {product_id} changed: quoted {quoted}, current {current}")]
    PriceChanged { product_id: ProductId, quoted: Money, current: Money },
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock { product_id: ProductId, requested: u32, available: u32 },
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order is already {0}")]
    AlreadyTerminal(OrderStatus),
    #[error("Order cannot be cancelled while {0}")]
    NotCancellable(OrderStatus),
    #[error("Order {0} is already settled")]
    AlreadySettled(OrderId),
    #[error("Order {id} is not eligible for settlement while {status}")]
    NotSettleable { id: OrderId, status: OrderStatus },
    #[error("Coupon {0} is outside its validity window")]
    CouponExpired(CouponId),
    #[error("Coupon {0} does not apply to this store")]
    CouponNotApplicable(CouponId),
    #[error("Order {step} step failed: {message}")]
    Internal { step: OrderStep, message: String },
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::ValidationError(_) => ErrorKind::Validation,
            OrderError::NotFound { .. } => ErrorKind::NotFound,
            OrderError::InactiveProduct(_)
            | OrderError::PriceChanged { .. }
            | OrderError::InsufficientStock { .. }
            | OrderError::InvalidTransition { .. }
            | OrderError::AlreadyTerminal(_)
            | OrderError::NotCancellable(_)
            | OrderError::AlreadySettled(_)
            | OrderError::NotSettleable { .. }
            | OrderError::CouponExpired(_)
            | OrderError::CouponNotApplicable(_) => ErrorKind::Conflict,
            OrderError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn internal(step: OrderStep, e: impl fmt::Display) -> Self {
        OrderError::Internal { step, message: e.to_string() }
    }

    pub fn not_found(kind: &'static str, id: impl fmt::Display) -> Self {
        OrderError::NotFound { kind, id: id.to_string() }
    }
}

impl From<FrameworkError<OrderError>> for OrderError {
    fn from(e: FrameworkError<OrderError>) -> Self {
        match e {
            FrameworkError::NotFound { kind, id } => OrderError::NotFound { kind, id },
            FrameworkError::Entity(inner) => inner,
            other => OrderError::internal(OrderStep::Persist, other),
        }
    }
}
