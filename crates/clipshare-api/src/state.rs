//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what they need
//! via Axum's `FromRef`.

use clipshare_db::{AnalyticsRepository, VideoRepository};
use clipshare_processing::Transcoder;
use clipshare_storage::BlobStore;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Database pool and repositories.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub video_repository: VideoRepository,
    pub analytics_repository: AnalyticsRepository,
}

impl DbState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            video_repository: VideoRepository::new(pool.clone()),
            analytics_repository: AnalyticsRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Blob store, transcoder and upload limits.
#[derive(Clone)]
pub struct MediaState {
    pub storage: Arc<dyn BlobStore>,
    pub transcoder: Arc<dyn Transcoder>,
    pub max_upload_bytes: u64,
    /// Bound on one upload's processing, external tools included
    pub request_timeout: Duration,
    pub public_base_url: String,
}

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub media: MediaState,
}

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for MediaState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.media.clone()
    }
}
