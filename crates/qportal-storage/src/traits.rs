//! Storage abstraction trait
//!
//! Defines the Storage trait implemented by every storage backend.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Keys are relative to the storage root; see the crate root documentation for
/// the key layout.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `storage_key`, replacing any existing file.
    /// Returns the public URL of the stored file.
    async fn put(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key. Deleting a missing file succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the size in bytes of an object, if it exists.
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Resolve a storage key to an absolute filesystem path.
    ///
    /// The file is not required to exist; callers that need it check with
    /// [`Storage::exists`]. Keys escaping the storage root are rejected.
    fn resolve_path(&self, storage_key: &str) -> StorageResult<PathBuf>;

    /// Public URL for a stored file
    fn public_url(&self, storage_key: &str) -> String;

    /// Download a file as a stream of `Bytes` chunks.
    async fn download_stream(
        &self,
        storage_key: &str,
    ) -> StorageResult<Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>>;
}
