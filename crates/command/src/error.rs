//! Service error types.

use common::Status;
use common::status::{CATEGORY_IN_USE, STORAGE_UNAVAILABLE};
use domain::{EntityKind, StorageError, ValidationError};
use thiserror::Error;

/// Errors returned by the application services.
///
/// Storage and transaction errors pass through unchanged; the services add
/// only the `AlreadyExists` kind.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed value-object validation; no transaction was opened.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An entity with the same name already exists.
    #[error("{entity} already exists: {name}")]
    AlreadyExists { entity: EntityKind, name: String },

    /// Error from the repository or transaction manager.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ServiceError::AlreadyExists { .. } | ServiceError::Storage(StorageError::Duplicate { .. })
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Storage(StorageError::NotFound { .. }))
    }

    /// Converts the error into its stable `(code, message)` pair.
    pub fn to_status(&self) -> Status {
        match self {
            ServiceError::Validation(err) => Status::invalid_argument(err.to_string()),
            ServiceError::AlreadyExists { entity, .. }
            | ServiceError::Storage(StorageError::Duplicate { entity, .. }) => {
                Status::already_exists(entity.already_exists_reason())
            }
            ServiceError::Storage(StorageError::NotFound { entity, .. }) => {
                Status::not_found(entity.not_found_reason())
            }
            ServiceError::Storage(StorageError::StillReferenced { .. }) => {
                Status::failed_precondition(CATEGORY_IN_USE)
            }
            ServiceError::Storage(StorageError::Unavailable(detail)) => {
                tracing::error!(error = %detail, "storage unavailable");
                Status::unavailable(STORAGE_UNAVAILABLE)
            }
            ServiceError::Storage(err) => {
                tracing::error!(error = %err, "internal storage error");
                Status::internal()
            }
        }
    }
}

impl From<ServiceError> for Status {
    fn from(err: ServiceError) -> Self {
        err.to_status()
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
