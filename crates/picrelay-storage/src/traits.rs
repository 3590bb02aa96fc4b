//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement.

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait so
/// the event handler works with any backend without coupling to its details.
/// Uploads overwrite silently; the timestamp component of derived names keeps
/// redelivered events from clobbering earlier objects.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a file into the destination folder and return an opaque
    /// stored-object identifier.
    async fn upload(&self, folder: &str, filename: &str, data: Vec<u8>) -> StorageResult<String>;
}

/// Build the object key shared by all backends.
pub(crate) fn object_key(folder: &str, filename: &str) -> StorageResult<String> {
    let folder = folder.trim_matches('/');
    if folder.is_empty() || filename.is_empty() {
        return Err(StorageError::InvalidKey(
            "folder and filename must be non-empty".to_string(),
        ));
    }
    let key = format!("{}/{}", folder, filename);
    if key.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "key contains path traversal: {}",
            key
        )));
    }
    Ok(key)
}
