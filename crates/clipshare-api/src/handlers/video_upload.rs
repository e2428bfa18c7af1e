use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use clipshare_core::models::UploadedVideo;

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::UploadPipeline;
use crate::state::{DbState, MediaState};

#[utoipa::path(
    post,
    path = "/videos",
    tag = "videos",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: `file` (required), `startTime` and `endTime` in seconds (optional)"),
    responses(
        (status = 201, description = "Video uploaded and published", body = UploadedVideo),
        (status = 400, description = "Missing file, invalid type or malformed form", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Processing or storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(operation = "upload_video"))]
pub async fn upload_video(
    State(db): State<DbState>,
    State(media): State<MediaState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let uploaded = UploadPipeline::new(&db, &media).run(multipart).await?;
    Ok((StatusCode::CREATED, Json(uploaded)))
}
