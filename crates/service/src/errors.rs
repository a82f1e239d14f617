use thiserror::Error;

use crate::store::StoreError;

/// Operation-level error taxonomy. Callers can always tell "your input was
/// bad" from "the record does not exist" from "a strict dependency was down".
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("upstream rejected request with status {0}")]
    UpstreamRejected(u16),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound("entity not found".into()),
            StoreError::Unavailable(msg) => Self::UpstreamUnavailable(msg),
            StoreError::Rejected(status) => Self::UpstreamRejected(status),
            StoreError::Decode(msg) => Self::Internal(msg),
        }
    }
}

impl From<models::ModelError> for ServiceError {
    fn from(err: models::ModelError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
