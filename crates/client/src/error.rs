//! Client error types.

use common::{Code, Status};
use domain::ValidationError;
use thiserror::Error;

/// Errors returned by [`CqrsRepository`](crate::CqrsRepository).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with an error status; passed through unchanged.
    #[error("rpc error: {0}")]
    Rpc(#[from] Status),

    /// The backend returned a DTO that is not a valid entity.
    #[error("invalid response: {0}")]
    InvalidResponse(#[from] ValidationError),
}

impl ClientError {
    /// The backend status, if this error came from one.
    pub fn status(&self) -> Option<&Status> {
        match self {
            ClientError::Rpc(status) => Some(status),
            ClientError::InvalidResponse(_) => None,
        }
    }

    pub fn code(&self) -> Code {
        match self {
            ClientError::Rpc(status) => status.code(),
            ClientError::InvalidResponse(_) => Code::Internal,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
