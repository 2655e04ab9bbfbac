//! Storage abstraction trait

use async_trait::async_trait;
use bytes::Bytes;
use folio_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Remove failed: {0}")]
    RemoveFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File not found: {}", key)),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Byte storage addressed by storage key.
///
/// Implementations create any directories a key implies and never inspect
/// content. `remove` of a missing key succeeds.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` at `storage_key`, replacing anything already there.
    async fn write(&self, storage_key: &str, data: Bytes, content_type: &str)
        -> StorageResult<()>;

    /// Read the full contents stored at `storage_key`.
    async fn read(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Remove the file at `storage_key`. Idempotent.
    async fn remove(&self, storage_key: &str) -> StorageResult<()>;

    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Publicly reachable URL for a key.
    fn public_url(&self, storage_key: &str) -> String;
}
