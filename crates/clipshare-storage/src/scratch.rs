//! Local scratch space for raw uploads and transcoder output.

use crate::keys::{video_filename, RAW_PREFIX, VIDEOS_PREFIX};
use crate::traits::{StorageError, StorageResult};
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// `{upload_dir}/raw` and `{upload_dir}/videos`, files named `{id}.webm`.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    upload_dir: PathBuf,
}

impl ScratchSpace {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.upload_dir.join(RAW_PREFIX)
    }

    pub fn final_dir(&self) -> PathBuf {
        self.upload_dir.join(VIDEOS_PREFIX)
    }

    pub fn raw_path(&self, id: Uuid) -> PathBuf {
        self.raw_dir().join(video_filename(id))
    }

    pub fn final_path(&self, id: Uuid) -> PathBuf {
        self.final_dir().join(video_filename(id))
    }

    pub async fn ensure(&self) -> StorageResult<()> {
        for dir in [self.raw_dir(), self.final_dir()] {
            fs::create_dir_all(&dir).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    pub async fn save_raw(&self, id: Uuid, data: Bytes) -> StorageResult<PathBuf> {
        let path = self.raw_path(id);
        let size = data.len();
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            video_id = %id,
            path = %path.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Raw upload written"
        );

        Ok(path)
    }

    pub async fn discard_raw(&self, id: Uuid) -> StorageResult<()> {
        remove_if_exists(&self.raw_path(id)).await
    }
}

/// Remove a file, treating "already gone" as success.
pub async fn remove_if_exists(path: &Path) -> StorageResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::DeleteFailed(format!(
            "Failed to delete file {}: {}",
            path.display(),
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_discard_raw() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchSpace::new(dir.path());
        scratch.ensure().await.unwrap();
        // Idempotent
        scratch.ensure().await.unwrap();

        let id = Uuid::new_v4();
        let path = scratch
            .save_raw(id, Bytes::from_static(b"webm bytes"))
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("raw").join(format!("{}.webm", id)));
        assert_eq!(std::fs::read(&path).unwrap(), b"webm bytes");

        scratch.discard_raw(id).await.unwrap();
        assert!(!path.exists());

        // Discarding twice is fine
        scratch.discard_raw(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_raw_without_directories_fails() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchSpace::new(dir.path().join("missing"));

        let result = scratch.save_raw(Uuid::new_v4(), Bytes::from_static(b"x")).await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }

    #[test]
    fn test_final_path_layout() {
        let scratch = ScratchSpace::new("/srv/uploads");
        let id = Uuid::new_v4();
        assert_eq!(
            scratch.final_path(id),
            PathBuf::from(format!("/srv/uploads/videos/{}.webm", id))
        );
    }
}
