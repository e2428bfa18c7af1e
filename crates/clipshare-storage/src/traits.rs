//! Blob store abstraction trait
//!
//! This module defines the BlobStore trait that both storage backends implement.

use crate::scratch::ScratchSpace;
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use clipshare_core::AppError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

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

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Blob store abstraction
///
/// Raw uploads and transcoder output always live in local scratch space; the
/// backend decides where the finished recording is published and which URL it is
/// served from. A single implementation is chosen at startup.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Local scratch area shared by both backends
    fn scratch(&self) -> &ScratchSpace;

    /// Create the scratch directories. Safe to call on every request.
    async fn ensure_directories(&self) -> StorageResult<()> {
        self.scratch().ensure().await
    }

    /// Persist raw uploaded bytes and return their local path
    async fn save_raw(&self, id: Uuid, data: Bytes) -> StorageResult<PathBuf> {
        self.scratch().save_raw(id, data).await
    }

    fn raw_path_for(&self, id: Uuid) -> PathBuf {
        self.scratch().raw_path(id)
    }

    /// Remove the raw upload. A missing file is not an error.
    async fn discard_raw(&self, id: Uuid) -> StorageResult<()> {
        self.scratch().discard_raw(id).await
    }

    /// Local path the transcoder writes its output to
    fn final_path_for(&self, id: Uuid) -> PathBuf {
        self.scratch().final_path(id)
    }

    /// Make the processed file at `local_path` durable under the video's key
    async fn publish_final(&self, id: Uuid, local_path: &Path) -> StorageResult<()>;

    /// Public URL the published recording is served from
    fn public_url_for(&self, id: Uuid) -> String;

    /// Check whether the published recording exists
    async fn exists(&self, id: Uuid) -> StorageResult<bool>;

    /// Size in bytes of the published recording
    async fn stat_size(&self, id: Uuid) -> StorageResult<u64>;

    /// Delete the published recording. A missing object is not an error.
    async fn delete(&self, id: Uuid) -> StorageResult<()>;

    /// Get the backend type
    fn backend_type(&self) -> StorageBackend;

    /// Directory published files are served from over HTTP, for backends that serve locally
    fn serve_root(&self) -> Option<&Path> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_into_app_error() {
        let not_found: AppError = StorageError::NotFound("videos/x.webm".to_string()).into();
        assert!(matches!(not_found, AppError::NotFound(_)));

        let invalid: AppError = StorageError::InvalidKey("../etc".to_string()).into();
        assert!(matches!(invalid, AppError::InvalidInput(_)));

        let upload: AppError = StorageError::UploadFailed("403 Forbidden".to_string()).into();
        match upload {
            AppError::Storage(msg) => assert!(msg.contains("403 Forbidden")),
            other => panic!("Expected Storage variant, got {:?}", other),
        }
    }
}
