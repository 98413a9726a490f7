use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{ShipmentId, ShipmentStatus};
use crate::error::ErrorKind;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryError {
    #[error("Shipment not found: {0}")]
    NotFound(ShipmentId),
    #[error("Shipment already exists: {0}")]
    AlreadyExists(ShipmentId),
    #[error("Invalid shipment status change: {from:?} -> {to:?}")]
    InvalidStatusChange { from: ShipmentStatus, to: ShipmentStatus },
    #[error("Shipment validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl DeliveryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeliveryError::NotFound(_) => ErrorKind::NotFound,
            DeliveryError::AlreadyExists(_) | DeliveryError::InvalidStatusChange { .. } => ErrorKind::Conflict,
            DeliveryError::ValidationError(_) => ErrorKind::Validation,
            DeliveryError::ActorCommunicationError(_) => ErrorKind::Internal,
        }
    }
}

impl From<FrameworkError<DeliveryError>> for DeliveryError {
    fn from(e: FrameworkError<DeliveryError>) -> Self {
        match e {
            FrameworkError::NotFound { id, .. } => DeliveryError::NotFound(ShipmentId::new(id)),
            FrameworkError::AlreadyExists { id, .. } => DeliveryError::AlreadyExists(ShipmentId::new(id)),
            FrameworkError::Entity(inner) => inner,
            other => DeliveryError::ActorCommunicationError(other.to_string()),
        }
    }
}
