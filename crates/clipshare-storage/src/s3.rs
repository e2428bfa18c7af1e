use crate::keys::video_key;
use crate::scratch::{remove_if_exists, ScratchSpace};
use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use clipshare_core::ObjectStoreConfig;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// S3-compatible blob store (AWS S3, Cloudflare R2, MinIO)
#[derive(Clone)]
pub struct S3BlobStore {
    store: AmazonS3,
    bucket: String,
    public_base_url: String,
    scratch: ScratchSpace,
}

impl S3BlobStore {
    /// Create a new S3BlobStore instance
    ///
    /// # Arguments
    /// * `config` - Bucket, credentials and optional custom endpoint
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `upload_dir` - Local scratch area used before publishing
    pub async fn new(config: &ObjectStoreConfig, upload_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(config.region.clone())
            .with_bucket_name(config.bucket.clone())
            .with_access_key_id(config.access_key_id.clone())
            .with_secret_access_key(config.secret_access_key.clone());

        if let Some(ref endpoint) = config.endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let scratch = ScratchSpace::new(upload_dir);
        scratch.ensure().await?;

        Ok(S3BlobStore {
            store,
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            scratch,
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    async fn publish_final(&self, id: Uuid, local_path: &Path) -> StorageResult<()> {
        let key = video_key(id);
        let location = ObjectPath::from(key.as_str());

        let data = fs::read(local_path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to read {}: {}",
                local_path.display(),
                e
            ))
        })?;
        let size = data.len();

        let start = std::time::Instant::now();
        self.store
            .put(&location, PutPayload::from(data))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File uploaded to S3"
        );

        // The object is durable now; the local copy is only scratch.
        if let Err(e) = remove_if_exists(local_path).await {
            tracing::warn!(
                error = %e,
                path = %local_path.display(),
                "Failed to remove local copy after S3 upload"
            );
        }

        Ok(())
    }

    fn public_url_for(&self, id: Uuid) -> String {
        format!("{}/{}", self.public_base_url, video_key(id))
    }

    async fn exists(&self, id: Uuid) -> StorageResult<bool> {
        let location = ObjectPath::from(video_key(id).as_str());

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn stat_size(&self, id: Uuid) -> StorageResult<u64> {
        let key = video_key(id);
        let location = ObjectPath::from(key.as_str());

        match self.store.head(&location).await {
            Ok(meta) => Ok(meta.size as u64),
            Err(ObjectStoreError::NotFound { .. }) => Err(StorageError::NotFound(key)),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let key = video_key(id);
        let location = ObjectPath::from(key.as_str());

        match self.store.delete(&location).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            "File deleted from S3"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn object_store_config() -> ObjectStoreConfig {
        ObjectStoreConfig {
            bucket: "recordings".to_string(),
            region: "auto".to_string(),
            endpoint: Some("http://localhost:9000".to_string()),
            access_key_id: "minio".to_string(),
            secret_access_key: "minio-secret".to_string(),
            public_base_url: "https://cdn.example.com/".to_string(),
        }
    }

    #[tokio::test]
    async fn test_public_url_uses_configured_base() {
        let dir = TempDir::new().unwrap();
        let store = S3BlobStore::new(&object_store_config(), dir.path())
            .await
            .unwrap();
        let id = Uuid::new_v4();

        assert_eq!(
            store.public_url_for(id),
            format!("https://cdn.example.com/videos/{}.webm", id)
        );
        assert_eq!(store.backend_type(), StorageBackend::S3);
        assert!(store.serve_root().is_none());
    }

    #[tokio::test]
    async fn test_scratch_paths_are_local() {
        let dir = TempDir::new().unwrap();
        let store = S3BlobStore::new(&object_store_config(), dir.path())
            .await
            .unwrap();
        let id = Uuid::new_v4();

        assert!(dir.path().join("raw").is_dir());
        assert_eq!(
            store.final_path_for(id),
            dir.path().join("videos").join(format!("{}.webm", id))
        );
    }
}
