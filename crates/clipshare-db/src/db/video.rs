use clipshare_core::models::{NewVideo, Video};
use clipshare_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a published video. View count starts at 0.
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert", db.record_id = %video.id))]
    pub async fn create_video(&self, video: &NewVideo) -> Result<Video, AppError> {
        let row: Video = sqlx::query_as::<Postgres, Video>(
            r#"
            INSERT INTO videos (id, filename, content_type, duration, size_bytes, public_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(video.id)
        .bind(&video.filename)
        .bind(&video.content_type)
        .bind(video.duration)
        .bind(video.size_bytes)
        .bind(&video.public_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, video_id = %video.id, "Failed to insert video");
            AppError::from(e)
        })?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    pub async fn find_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let row: Option<Video> =
            sqlx::query_as::<Postgres, Video>("SELECT * FROM videos WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row)
    }

    /// Increment the view counter within a transaction. Returns false when the video doesn't exist.
    #[tracing::instrument(skip(tx), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    pub async fn increment_view_count_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE videos SET view_count = view_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
