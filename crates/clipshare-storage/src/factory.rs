#[cfg(feature = "storage-local")]
use crate::LocalBlobStore;
#[cfg(feature = "storage-s3")]
use crate::S3BlobStore;
use crate::{BlobStore, StorageBackend, StorageError, StorageResult};
use clipshare_core::Config;
use std::sync::Arc;

/// Create the blob store selected by configuration
pub async fn create_blob_store(config: &Config) -> StorageResult<Arc<dyn BlobStore>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let object_store = config.object_store().ok_or_else(|| {
                StorageError::ConfigError("S3_BUCKET not configured".to_string())
            })?;

            let storage = S3BlobStore::new(object_store, config.upload_dir()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalBlobStore::new(
                config.upload_dir(),
                config.public_base_url().to_string(),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use clipshare_core::ClipshareConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_factory_defaults_to_local() {
        let dir = TempDir::new().unwrap();
        let upload_dir = dir.path().to_string_lossy().to_string();
        let config = ClipshareConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgresql://localhost/clipshare".to_string()),
            "UPLOAD_DIR" => Some(upload_dir.clone()),
            _ => None,
        })
        .unwrap();

        let storage = create_blob_store(&Config(Box::new(config))).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
        assert!(dir.path().join("videos").is_dir());
    }
}
