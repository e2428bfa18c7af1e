use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use clipshare_core::models::{VideoAnalytics, VideoWithAnalytics};
use clipshare_core::AppError;

use super::parse_video_id;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::DbState;

#[utoipa::path(
    get,
    path = "/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video with analytics", body = VideoWithAnalytics),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(db), fields(video_id = %id, operation = "get_video"))]
pub async fn get_video(
    Path(id): Path<String>,
    State(db): State<DbState>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&id)?;

    let video = db
        .video_repository
        .find_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    let avg_watch_percentage = db
        .analytics_repository
        .average_watch_percentage(video_id)
        .await?;

    let analytics = VideoAnalytics {
        view_count: video.view_count,
        avg_watch_percentage,
    };

    Ok(Json(VideoWithAnalytics { video, analytics }))
}
