//! Storage setup and initialization

use anyhow::Result;
use clipshare_core::Config;
use clipshare_storage::{create_blob_store, BlobStore};
use std::sync::Arc;

/// Build the blob store selected by configuration and prepare its scratch directories.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn BlobStore>> {
    tracing::info!("Initializing blob store...");
    let storage = create_blob_store(config).await?;
    storage.ensure_directories().await?;

    tracing::info!(
        backend = ?storage.backend_type(),
        upload_dir = %config.upload_dir().display(),
        serves_media = storage.serve_root().is_some(),
        "Blob store initialized successfully"
    );

    Ok(storage)
}
