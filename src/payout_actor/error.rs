use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{OrderId, PayoutId, StoreId};
use crate::error::ErrorKind;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PayoutError {
    #[error("Payout not found: {0}")]
    NotFound(PayoutId),
    #[error("Payout {0} is immutable")]
    Immutable(PayoutId),
    #[error("Payout validation error: {0}")]
    ValidationError(String),
    #[error("Could not load stores: {0}")]
    StoreLookup(String),
    #[error("Could not load orders for store {store_id}: {message}")]
    OrderLookup { store_id: StoreId, message: String },
    #[error("Could not claim order {order_id}: {message}")]
    Claim { order_id: OrderId, message: String },
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl PayoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PayoutError::NotFound(_) => ErrorKind::NotFound,
            PayoutError::Immutable(_) => ErrorKind::Conflict,
            PayoutError::ValidationError(_) => ErrorKind::Validation,
            PayoutError::StoreLookup(_)
            | PayoutError::OrderLookup { .. }
            | PayoutError::Claim { .. }
            | PayoutError::ActorCommunicationError(_) => ErrorKind::Internal,
        }
    }
}

impl From<FrameworkError<PayoutError>> for PayoutError {
    fn from(e: FrameworkError<PayoutError>) -> Self {
        match e {
            FrameworkError::NotFound { id, .. } => PayoutError::NotFound(PayoutId::new(id)),
            FrameworkError::Entity(inner) => inner,
            other => PayoutError::ActorCommunicationError(other.to_string()),
        }
    }
}
