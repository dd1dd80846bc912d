//! Error taxonomy for record operations.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Patient already exists: {0}")]
    AlreadyExists(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type RecordResult<T> = Result<T, RecordError>;

impl<T> From<std::sync::PoisonError<T>> for RecordError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RecordError::Storage(StoreError::Poisoned(e.to_string()))
    }
}
