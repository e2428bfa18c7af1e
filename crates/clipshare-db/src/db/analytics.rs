use chrono::{DateTime, Utc};
use clipshare_core::models::{
    watch_percentage, NewVideoView, VideoView, WatchProgress, WatchSession, WatchSessionUpsert,
};
use clipshare_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::video::VideoRepository;

/// View tracking and watch-progress persistence
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, view), fields(db.table = "video_views", db.operation = "insert", video_id = %view.video_id))]
    pub async fn insert_view(&self, view: &NewVideoView) -> Result<VideoView, AppError> {
        let mut tx = self.pool.begin().await?;
        let row = Self::insert_view_tx(&mut tx, view).await?;
        tx.commit().await?;
        Ok(row)
    }

    #[tracing::instrument(skip(tx, view), fields(db.table = "video_views", db.operation = "insert", video_id = %view.video_id))]
    pub async fn insert_view_tx(
        tx: &mut Transaction<'_, Postgres>,
        view: &NewVideoView,
    ) -> Result<VideoView, AppError> {
        let row: VideoView = sqlx::query_as::<Postgres, VideoView>(
            r#"
            INSERT INTO video_views (id, video_id, session_id, user_agent, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(view.video_id)
        .bind(&view.session_id)
        .bind(&view.user_agent)
        .bind(view.created_at)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }

    /// Record a view and bump the video's counter atomically.
    ///
    /// Returns `NotFound` (and writes nothing) when the video doesn't exist.
    #[tracing::instrument(skip(self, view), fields(db.table = "video_views", db.operation = "insert", video_id = %view.video_id))]
    pub async fn record_view(&self, view: &NewVideoView) -> Result<VideoView, AppError> {
        let mut tx = self.pool.begin().await?;

        if !VideoRepository::increment_view_count_tx(&mut tx, view.video_id).await? {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!(
                "Video {} not found",
                view.video_id
            )));
        }

        let row = Self::insert_view_tx(&mut tx, view).await?;
        tx.commit().await?;

        Ok(row)
    }

    /// Most recent view for this session at or after `since`.
    #[tracing::instrument(skip(self, session_id), fields(db.table = "video_views", db.operation = "select", video_id = %video_id))]
    pub async fn find_recent_view(
        &self,
        video_id: Uuid,
        session_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<VideoView>, AppError> {
        let row: Option<VideoView> = sqlx::query_as::<Postgres, VideoView>(
            r#"
            SELECT * FROM video_views
            WHERE video_id = $1 AND session_id = $2 AND created_at >= $3
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(video_id)
        .bind(session_id)
        .bind(since)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Stored session with the furthest progress, if any.
    #[tracing::instrument(skip(self, session_id), fields(db.table = "watch_sessions", db.operation = "select", video_id = %video_id))]
    pub async fn find_watch_session(
        &self,
        video_id: Uuid,
        session_id: &str,
    ) -> Result<Option<WatchSession>, AppError> {
        let row: Option<WatchSession> = sqlx::query_as::<Postgres, WatchSession>(
            r#"
            SELECT * FROM watch_sessions
            WHERE video_id = $1 AND session_id = $2
            ORDER BY max_watched_seconds DESC
            LIMIT 1
            "#,
        )
        .bind(video_id)
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Apply a progress report, keeping only the maximum position seen.
    ///
    /// Find-then-write without a lock: two concurrent first reports for one
    /// session can both insert. Reads pick the row with the greatest progress.
    #[tracing::instrument(skip(self, progress), fields(db.table = "watch_sessions", db.operation = "upsert", video_id = %progress.video_id))]
    pub async fn upsert_watch_session(
        &self,
        progress: &WatchProgress,
    ) -> Result<WatchSessionUpsert, AppError> {
        let existing = self
            .find_watch_session(progress.video_id, &progress.session_id)
            .await?;

        match existing {
            None => {
                let row: WatchSession = sqlx::query_as::<Postgres, WatchSession>(
                    r#"
                    INSERT INTO watch_sessions (
                        id, video_id, session_id, max_watched_seconds, total_duration, watched_percentage
                    )
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING *
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(progress.video_id)
                .bind(&progress.session_id)
                .bind(progress.watched_seconds)
                .bind(progress.video_duration)
                .bind(progress.watched_percentage())
                .fetch_one(&self.pool)
                .await?;

                Ok(WatchSessionUpsert::Created(row))
            }
            Some(session) if progress.watched_seconds > session.max_watched_seconds => {
                let row: WatchSession = sqlx::query_as::<Postgres, WatchSession>(
                    r#"
                    UPDATE watch_sessions
                    SET max_watched_seconds = $2,
                        total_duration = $3,
                        watched_percentage = $4,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(session.id)
                .bind(progress.watched_seconds)
                .bind(progress.video_duration)
                .bind(watch_percentage(progress.watched_seconds, progress.video_duration))
                .fetch_one(&self.pool)
                .await?;

                Ok(WatchSessionUpsert::Advanced(row))
            }
            Some(session) => Ok(WatchSessionUpsert::Unchanged(session)),
        }
    }

    /// Mean watched percentage across a video's sessions; 0 when there are none.
    ///
    /// Duplicate rows for one session count once, at their greatest progress.
    #[tracing::instrument(skip(self), fields(db.table = "watch_sessions", db.operation = "select", video_id = %video_id))]
    pub async fn average_watch_percentage(&self, video_id: Uuid) -> Result<f64, AppError> {
        let avg: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(AVG(watched_percentage), 0)::DOUBLE PRECISION
            FROM (
                SELECT DISTINCT ON (session_id) watched_percentage
                FROM watch_sessions
                WHERE video_id = $1
                ORDER BY session_id, max_watched_seconds DESC
            ) per_session
            "#,
        )
        .bind(video_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(avg)
    }
}
