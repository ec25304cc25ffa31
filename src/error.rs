use thiserror::Error;

use crate::storage::StoreError;

pub type SyncResult<T> = Result<T, SyncError>;

/// Failures of the user and progress operations. The HTTP layer maps each
/// variant onto one response status.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("registration is disabled")]
    RegistrationDisabled,

    #[error("user {0:?} already exists")]
    AlreadyExists(String),

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0:?} not found")]
    NotFound(String),

    #[error("invalid document")]
    InvalidDocument,

    #[error("malformed record under {key:?}: {reason}")]
    MalformedRecord { key: String, reason: String },

    #[error("credential hashing failed: {0}")]
    Credential(String),

    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => SyncError::NotFound(key),
            other => SyncError::Storage(other),
        }
    }
}
