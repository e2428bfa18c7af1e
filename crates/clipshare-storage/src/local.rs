use crate::keys::video_key;
use crate::scratch::{remove_if_exists, ScratchSpace};
use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Local filesystem blob store
///
/// The transcoder output in `{upload_dir}/videos` is the published file; the API
/// serves it under `{public_base_url}/media/videos/{id}.webm`.
#[derive(Clone)]
pub struct LocalBlobStore {
    scratch: ScratchSpace,
    serve_root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    /// Create a new LocalBlobStore instance
    ///
    /// # Arguments
    /// * `upload_dir` - Root of the scratch area (e.g., "./uploads")
    /// * `public_base_url` - Base URL of this server (e.g., "http://localhost:3000")
    pub async fn new(upload_dir: impl Into<PathBuf>, public_base_url: String) -> StorageResult<Self> {
        let scratch = ScratchSpace::new(upload_dir);
        scratch.ensure().await?;
        let serve_root = scratch.final_dir();

        Ok(LocalBlobStore {
            scratch,
            serve_root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Resolve a client-supplied relative path against `root`.
///
/// Rejects parent or absolute components up front, then checks that the canonical
/// location stays under the canonical root (symlinks included). Returns
/// `NotFound` when the file does not exist and `InvalidKey` when it escapes.
pub fn resolve_within(root: &Path, requested: &str) -> StorageResult<PathBuf> {
    let relative = Path::new(requested);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if requested.is_empty() || escapes {
        return Err(StorageError::InvalidKey(
            "Path contains invalid components".to_string(),
        ));
    }

    let root_canonical = root.canonicalize().map_err(|e| {
        StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
    })?;

    let canonical = match root.join(relative).canonicalize() {
        Ok(p) => p,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StorageError::NotFound(requested.to_string()))
        }
        Err(e) => return Err(StorageError::IoError(e)),
    };

    if canonical.strip_prefix(&root_canonical).is_err() {
        return Err(StorageError::InvalidKey(
            "Path resolves outside storage directory".to_string(),
        ));
    }

    Ok(canonical)
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    async fn publish_final(&self, id: Uuid, local_path: &Path) -> StorageResult<()> {
        let target = self.scratch.final_path(id);
        if local_path != target {
            fs::rename(local_path, &target).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to move {} to {}: {}",
                    local_path.display(),
                    target.display(),
                    e
                ))
            })?;
        }

        if !fs::try_exists(&target).await? {
            return Err(StorageError::NotFound(target.display().to_string()));
        }

        tracing::info!(
            video_id = %id,
            path = %target.display(),
            "Video published to local storage"
        );

        Ok(())
    }

    fn public_url_for(&self, id: Uuid) -> String {
        format!("{}/media/{}", self.public_base_url, video_key(id))
    }

    async fn exists(&self, id: Uuid) -> StorageResult<bool> {
        Ok(fs::try_exists(self.scratch.final_path(id)).await?)
    }

    async fn stat_size(&self, id: Uuid) -> StorageResult<u64> {
        let path = self.scratch.final_path(id);
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(video_key(id)))
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let path = self.scratch.final_path(id);
        remove_if_exists(&path).await?;

        tracing::info!(
            video_id = %id,
            path = %path.display(),
            "Video deleted from local storage"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    fn serve_root(&self) -> Option<&Path> {
        Some(&self.serve_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tempfile::TempDir;

    async fn store(dir: &TempDir) -> LocalBlobStore {
        LocalBlobStore::new(dir.path(), "http://localhost:3000/".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_publish_stat_delete() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let id = Uuid::new_v4();

        let final_path = store.final_path_for(id);
        std::fs::write(&final_path, b"processed").unwrap();

        store.publish_final(id, &final_path).await.unwrap();
        assert!(store.exists(id).await.unwrap());
        assert_eq!(store.stat_size(id).await.unwrap(), 9);

        store.delete(id).await.unwrap();
        assert!(!store.exists(id).await.unwrap());
        assert!(matches!(
            store.stat_size(id).await,
            Err(StorageError::NotFound(_))
        ));

        // Deleting a missing file is not an error
        store.delete(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_publish_missing_output_fails() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let id = Uuid::new_v4();

        let result = store.publish_final(id, &store.final_path_for(id)).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_public_url_and_serve_root() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let id = Uuid::new_v4();

        assert_eq!(
            store.public_url_for(id),
            format!("http://localhost:3000/media/videos/{}.webm", id)
        );
        assert_eq!(store.serve_root(), Some(dir.path().join("videos").as_path()));
        assert_eq!(store.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn test_raw_file_lives_outside_serve_root() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let id = Uuid::new_v4();

        let raw = store.save_raw(id, Bytes::from_static(b"raw")).await.unwrap();
        let root = store.serve_root().unwrap();
        assert!(raw.strip_prefix(root).is_err());
    }

    #[tokio::test]
    async fn test_resolve_within() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("videos");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("a.webm"), b"a").unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"s").unwrap();

        let resolved = resolve_within(&root, "a.webm").unwrap();
        assert_eq!(resolved, root.canonicalize().unwrap().join("a.webm"));

        assert!(matches!(
            resolve_within(&root, "../secret.txt"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            resolve_within(&root, "/etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            resolve_within(&root, "missing.webm"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_within_rejects_symlink_escape() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("videos");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"s").unwrap();
        std::os::unix::fs::symlink(dir.path().join("secret.txt"), root.join("link.webm")).unwrap();

        assert!(matches!(
            resolve_within(&root, "link.webm"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
