//! Query error types.

use common::Status;
use common::status::STORAGE_UNAVAILABLE;
use domain::{EntityKind, StorageError, ValidationError};
use thiserror::Error;

/// Errors that can occur while serving reads.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The requested entity is not in the read model.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// The request carried a malformed id.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// An error occurred in the underlying store.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl QueryError {
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        QueryError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Converts the error into its stable `(code, message)` pair.
    pub fn to_status(&self) -> Status {
        match self {
            QueryError::NotFound { entity, .. } => Status::not_found(entity.not_found_reason()),
            QueryError::Validation(err) => Status::invalid_argument(err.to_string()),
            QueryError::Storage(StorageError::Unavailable(detail)) => {
                tracing::error!(error = %detail, "read store unavailable");
                Status::unavailable(STORAGE_UNAVAILABLE)
            }
            QueryError::Storage(err) => {
                tracing::error!(error = %err, "internal read error");
                Status::internal()
            }
        }
    }
}

impl From<QueryError> for Status {
    fn from(err: QueryError) -> Self {
        err.to_status()
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use common::Code;

    #[test]
    fn not_found_uses_entity_reason() {
        let status = QueryError::not_found(EntityKind::Product, "abc").to_status();
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "PRODUCT_NOT_FOUND");
    }

    #[test]
    fn unavailable_storage_keeps_stable_message() {
        let status = Status::from(QueryError::from(StorageError::Unavailable(
            "pool timed out".to_string(),
        )));
        assert_eq!(status.code(), Code::Unavailable);
        assert_eq!(status.message(), "STORAGE_UNAVAILABLE");
    }
}
