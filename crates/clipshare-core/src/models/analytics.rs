use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Watch percentage clamped to 0..=100.
///
/// Callers validate that `total_duration` is positive.
pub fn watch_percentage(watched_seconds: f64, total_duration: f64) -> f64 {
    (watched_seconds / total_duration * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct VideoView {
    pub id: Uuid,
    pub video_id: Uuid,
    pub session_id: String,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVideoView {
    pub video_id: Uuid,
    pub session_id: String,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct WatchSession {
    pub id: Uuid,
    pub video_id: Uuid,
    pub session_id: String,
    /// Furthest position reached by this session; never decreases
    pub max_watched_seconds: f64,
    pub total_duration: f64,
    pub watched_percentage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A progress report from a viewer.
#[derive(Debug, Clone)]
pub struct WatchProgress {
    pub video_id: Uuid,
    pub session_id: String,
    pub watched_seconds: f64,
    pub video_duration: f64,
}

impl WatchProgress {
    pub fn watched_percentage(&self) -> f64 {
        watch_percentage(self.watched_seconds, self.video_duration)
    }
}

/// Outcome of applying a progress report to the stored session.
#[derive(Debug, Clone)]
pub enum WatchSessionUpsert {
    Created(WatchSession),
    Advanced(WatchSession),
    /// Report did not exceed the stored max; row left untouched
    Unchanged(WatchSession),
}

impl WatchSessionUpsert {
    pub fn session(&self) -> &WatchSession {
        match self {
            WatchSessionUpsert::Created(s)
            | WatchSessionUpsert::Advanced(s)
            | WatchSessionUpsert::Unchanged(s) => s,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoAnalytics {
    pub view_count: i64,
    pub avg_watch_percentage: f64,
}
