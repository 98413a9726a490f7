use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::error::ErrorKind;

/// Errors raised by the reference-data actors (users, stores, catalog, coupons).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DirectoryError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("Directory validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl DirectoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::NotFound { .. } => ErrorKind::NotFound,
            DirectoryError::AlreadyExists { .. } => ErrorKind::Conflict,
            DirectoryError::ValidationError(_) => ErrorKind::Validation,
            DirectoryError::ActorCommunicationError(_) => ErrorKind::Internal,
        }
    }
}

impl From<FrameworkError<DirectoryError>> for DirectoryError {
    fn from(e: FrameworkError<DirectoryError>) -> Self {
        match e {
            FrameworkError::NotFound { kind, id } => DirectoryError::NotFound { kind, id },
            FrameworkError::AlreadyExists { kind, id } => DirectoryError::AlreadyExists { kind, id },
            FrameworkError::Entity(inner) => inner,
            other => DirectoryError::ActorCommunicationError(other.to_string()),
        }
    }
}
