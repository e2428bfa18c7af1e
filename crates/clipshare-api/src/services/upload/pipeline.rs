//! Upload workflow: extract → validate → save raw → trim/copy → verify → probe → publish → persist

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Multipart;
use bytes::Bytes;
use clipshare_core::models::{NewVideo, UploadedVideo, Video, VIDEO_CONTENT_TYPE};
use clipshare_core::AppError;
use clipshare_db::VideoRepository;
use clipshare_processing::{Transcoder, TrimRange};
use clipshare_storage::keys::video_filename;
use clipshare_storage::scratch::remove_if_exists;
use clipshare_storage::BlobStore;
use tokio::time::{timeout_at, Instant};
use uuid::Uuid;

use super::form::read_upload_form;
use crate::constants::DEFAULT_DURATION_SECONDS;
use crate::state::{DbState, MediaState};

/// Orchestrates one `POST /videos` request.
///
/// The processing deadline is taken when the request starts and covers the
/// body read. Processing runs in a spawned task so a dropped request future
/// never interrupts cleanup of scratch files or the external tool.
pub struct UploadPipeline {
    storage: Arc<dyn BlobStore>,
    transcoder: Arc<dyn Transcoder>,
    videos: VideoRepository,
    max_upload_bytes: u64,
    timeout: Duration,
    public_base_url: String,
}

impl UploadPipeline {
    pub fn new(db: &DbState, media: &MediaState) -> Self {
        Self {
            storage: media.storage.clone(),
            transcoder: media.transcoder.clone(),
            videos: db.video_repository.clone(),
            max_upload_bytes: media.max_upload_bytes,
            timeout: media.request_timeout,
            public_base_url: media.public_base_url.clone(),
        }
    }

    pub async fn run(&self, multipart: Multipart) -> Result<UploadedVideo, AppError> {
        let deadline = Instant::now() + self.timeout;
        self.storage.ensure_directories().await?;

        let form = timeout_at(deadline, read_upload_form(multipart, self.max_upload_bytes))
            .await
            .map_err(|_| timed_out(self.timeout))??;
        form.validate()?;

        let id = Uuid::new_v4();
        let trim = TrimRange::from_fields(form.start_time, form.end_time);

        tracing::info!(
            video_id = %id,
            size_bytes = form.file.len(),
            content_type = %form.content_type,
            trim_start = trim.map(|t| t.start),
            trim_end = trim.map(|t| t.end),
            "Processing upload"
        );

        let task = ProcessingTask {
            id,
            data: form.file,
            trim,
            storage: self.storage.clone(),
            transcoder: self.transcoder.clone(),
            videos: self.videos.clone(),
            deadline,
            timeout: self.timeout,
        };

        let video = tokio::spawn(task.run())
            .await
            .map_err(|e| AppError::Internal(format!("Upload processing task failed: {}", e)))??;

        Ok(UploadedVideo::new(&video, &self.public_base_url))
    }
}

struct ProcessingTask {
    id: Uuid,
    data: Bytes,
    trim: Option<TrimRange>,
    storage: Arc<dyn BlobStore>,
    transcoder: Arc<dyn Transcoder>,
    videos: VideoRepository,
    deadline: Instant,
    timeout: Duration,
}

impl ProcessingTask {
    async fn run(self) -> Result<Video, AppError> {
        let started = Instant::now();
        let final_path = self.storage.final_path_for(self.id);

        // Once published, the row insert runs to completion outside the deadline
        let result = match timeout_at(self.deadline, self.publish(&final_path)).await {
            Ok(Ok(new_video)) => self.persist(&new_video).await,
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::error!(
                    video_id = %self.id,
                    timeout_secs = self.timeout.as_secs(),
                    "Upload processing timed out"
                );
                self.discard_unpersisted(&final_path).await;
                Err(timed_out(self.timeout))
            }
        };

        if let Err(e) = self.storage.discard_raw(self.id).await {
            tracing::warn!(video_id = %self.id, error = %e, "Failed to delete raw upload");
        }

        match &result {
            Ok(video) => tracing::info!(
                video_id = %video.id,
                duration = video.duration,
                size_bytes = video.size_bytes,
                duration_ms = started.elapsed().as_millis() as u64,
                "Upload published"
            ),
            Err(e) => tracing::warn!(
                video_id = %self.id,
                error = %e,
                duration_ms = started.elapsed().as_millis() as u64,
                "Upload failed"
            ),
        }

        result
    }

    /// Save, process, verify and publish. Returns the row to insert.
    async fn publish(&self, final_path: &Path) -> Result<NewVideo, AppError> {
        let raw_path = self.storage.save_raw(self.id, self.data.clone()).await?;

        let duration = match self.transcode(&raw_path, final_path).await {
            Ok(duration) => duration,
            Err(e) => {
                discard_file(final_path).await;
                return Err(e);
            }
        };

        let size_bytes = match tokio::fs::metadata(final_path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                discard_file(final_path).await;
                return Err(AppError::Storage(format!(
                    "Failed to stat processed video: {}",
                    e
                )));
            }
        };

        if let Err(e) = self.storage.publish_final(self.id, final_path).await {
            tracing::error!(video_id = %self.id, error = %e, "Failed to publish video");
            discard_file(final_path).await;
            return Err(e.into());
        }

        Ok(NewVideo {
            id: self.id,
            filename: video_filename(self.id),
            content_type: VIDEO_CONTENT_TYPE.to_string(),
            duration,
            size_bytes: size_bytes as i64,
            public_url: self.storage.public_url_for(self.id),
        })
    }

    async fn persist(&self, new_video: &NewVideo) -> Result<Video, AppError> {
        match self.videos.create_video(new_video).await {
            Ok(video) => Ok(video),
            Err(e) => {
                // Row insert failed after publish: remove the blob so it doesn't leak
                if let Err(delete_err) = self.storage.delete(self.id).await {
                    tracing::error!(
                        video_id = %self.id,
                        error = %delete_err,
                        "Failed to delete published video after database error"
                    );
                }
                Err(e)
            }
        }
    }

    /// Remove whatever an interrupted `publish` left behind. No row exists yet.
    async fn discard_unpersisted(&self, final_path: &Path) {
        discard_file(final_path).await;
        if let Err(e) = self.storage.delete(self.id).await {
            tracing::warn!(video_id = %self.id, error = %e, "Failed to delete interrupted upload");
        }
    }

    /// Trim or remux into `final_path`, verify the output and resolve its duration.
    async fn transcode(&self, raw_path: &Path, final_path: &Path) -> Result<f64, AppError> {
        let outcome = match self.trim {
            Some(range) => {
                self.transcoder
                    .trim(raw_path, final_path, range.start, range.end)
                    .await
            }
            None => self.transcoder.copy(raw_path, final_path).await,
        };

        outcome.map_err(|e| AppError::ProcessingFailed {
            message: "Video processing failed".to_string(),
            diagnostic: Some(e.diagnostic()),
        })?;

        if !tokio::fs::try_exists(final_path).await.unwrap_or(false) {
            return Err(AppError::ProcessingFailed {
                message: "Video processing produced no output file".to_string(),
                diagnostic: None,
            });
        }

        let duration = match self.transcoder.probe_duration(final_path).await {
            Some(probed) => probed,
            None => {
                let fallback = self
                    .trim
                    .map(|t| t.duration())
                    .unwrap_or(DEFAULT_DURATION_SECONDS);
                tracing::warn!(
                    video_id = %self.id,
                    fallback,
                    "Duration probe failed, using fallback"
                );
                fallback
            }
        };

        Ok(duration)
    }
}

async fn discard_file(path: &Path) {
    if let Err(e) = remove_if_exists(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to delete partial output");
    }
}

fn timed_out(timeout: Duration) -> AppError {
    AppError::ProcessingFailed {
        message: format!("Video processing exceeded {} seconds", timeout.as_secs()),
        diagnostic: None,
    }
}
