use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::ProductId;
use crate::error::ErrorKind;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum InventoryError {
    #[error("Inventory record not found: {0}")]
    NotFound(ProductId),
    #[error("Inventory record already exists: {0}")]
    AlreadyExists(ProductId),
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock { product_id: ProductId, requested: u32, available: u32 },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Stock counter overflow for {0}")]
    Overflow(ProductId),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::NotFound(_) => ErrorKind::NotFound,
            InventoryError::AlreadyExists(_) | InventoryError::InsufficientStock { .. } => ErrorKind::Conflict,
            InventoryError::InvalidQuantity(_) => ErrorKind::Validation,
            InventoryError::Overflow(_) | InventoryError::ActorCommunicationError(_) => ErrorKind::Internal,
        }
    }
}

impl From<FrameworkError<InventoryError>> for InventoryError {
    fn from(e: FrameworkError<InventoryError>) -> Self {
        match e {
            FrameworkError::NotFound { id, .. } => InventoryError::NotFound(ProductId::new(id)),
            FrameworkError::AlreadyExists { id, .. } => InventoryError::AlreadyExists(ProductId::new(id)),
            FrameworkError::Entity(inner) => inner,
            other => InventoryError::ActorCommunicationError(other.to_string()),
        }
    }
}
