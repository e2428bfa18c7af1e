//! Service initialization and application state setup

use anyhow::Context;
use clipshare_core::Config;
use clipshare_processing::{FfmpegTranscoder, Transcoder};
use clipshare_storage::BlobStore;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::state::{AppState, DbState, MediaState};

/// Wire repositories, the blob store and the ffmpeg transcoder into application state.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn BlobStore>,
) -> Result<Arc<AppState>, anyhow::Error> {
    let transcoder = FfmpegTranscoder::new(
        config.ffmpeg_path().to_string(),
        config.ffprobe_path().to_string(),
    )
    .context("Invalid ffmpeg/ffprobe configuration")?;

    tracing::info!(
        ffmpeg_path = %config.ffmpeg_path(),
        ffprobe_path = %config.ffprobe_path(),
        "Transcoder initialized"
    );

    Ok(build_state(config, pool, storage, Arc::new(transcoder)))
}

/// Assemble state from already-built components.
pub fn build_state(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn BlobStore>,
    transcoder: Arc<dyn Transcoder>,
) -> Arc<AppState> {
    Arc::new(AppState {
        db: DbState::new(pool),
        media: MediaState {
            storage,
            transcoder,
            max_upload_bytes: config.max_upload_size_bytes(),
            request_timeout: Duration::from_secs(config.request_timeout_secs()),
            public_base_url: config.public_base_url().trim_end_matches('/').to_string(),
        },
    })
}
