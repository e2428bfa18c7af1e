//! Blob store double whose publish step always fails.

use async_trait::async_trait;
use clipshare_storage::{
    BlobStore, LocalBlobStore, ScratchSpace, StorageBackend, StorageError, StorageResult,
};
use std::path::Path;
use uuid::Uuid;

pub struct FailingPublishStore {
    inner: LocalBlobStore,
}

impl FailingPublishStore {
    pub fn new(inner: LocalBlobStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl BlobStore for FailingPublishStore {
    fn scratch(&self) -> &ScratchSpace {
        self.inner.scratch()
    }

    async fn publish_final(&self, _id: Uuid, _local_path: &Path) -> StorageResult<()> {
        Err(StorageError::UploadFailed("bucket unavailable".to_string()))
    }

    fn public_url_for(&self, id: Uuid) -> String {
        self.inner.public_url_for(id)
    }

    async fn exists(&self, id: Uuid) -> StorageResult<bool> {
        self.inner.exists(id).await
    }

    async fn stat_size(&self, id: Uuid) -> StorageResult<u64> {
        self.inner.stat_size(id).await
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        self.inner.delete(id).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
