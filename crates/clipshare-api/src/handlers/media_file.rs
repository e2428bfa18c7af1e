//! Serves published recordings from the local blob store with byte-range support.

use std::io::SeekFrom;
use std::path::Path as FsPath;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use clipshare_core::AppError;
use clipshare_storage::{resolve_within, StorageError};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::constants::MEDIA_CACHE_CONTROL;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::MediaState;
use crate::utils::range::RangeRequest;

fn content_type_for(path: &FsPath) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("webm") => "video/webm",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

fn resolve_error(err: StorageError, requested: &str) -> AppError {
    match err {
        StorageError::InvalidKey(reason) => {
            tracing::warn!(requested = %requested, reason = %reason, "Rejected media path");
            AppError::Forbidden("Path outside media directory".to_string())
        }
        StorageError::NotFound(_) => AppError::NotFound(format!("File {} not found", requested)),
        other => other.into(),
    }
}

fn build_response(
    builder: axum::http::response::Builder,
    body: Body,
) -> Result<Response, HttpAppError> {
    builder.body(body).map_err(|e| {
        tracing::error!(error = %e, "Failed to build response");
        HttpAppError::from(AppError::Internal(e.to_string()))
    })
}

#[utoipa::path(
    get,
    path = "/media/videos/{path}",
    tag = "media",
    params(
        ("path" = String, Path, description = "File path relative to the media directory"),
        ("Range" = Option<String>, Header, description = "Single byte range, e.g. `bytes=0-1023`")
    ),
    responses(
        (status = 200, description = "Whole file"),
        (status = 206, description = "Requested byte range"),
        (status = 403, description = "Path escapes the media directory", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 416, description = "Range not satisfiable")
    )
)]
#[tracing::instrument(skip(media, headers), fields(operation = "serve_media"))]
pub async fn serve_media(
    Path(path): Path<String>,
    State(media): State<MediaState>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let root = media
        .storage
        .serve_root()
        .ok_or_else(|| AppError::NotFound("Media is not served locally".to_string()))?;

    let file_path = resolve_within(root, &path).map_err(|e| resolve_error(e, &path))?;

    let metadata = tokio::fs::metadata(&file_path)
        .await
        .map_err(|_| AppError::NotFound(format!("File {} not found", path)))?;
    if !metadata.is_file() {
        return Err(AppError::NotFound(format!("File {} not found", path)).into());
    }
    let size = metadata.len();

    let mut file = tokio::fs::File::open(&file_path)
        .await
        .map_err(|e| AppError::Storage(format!("Failed to open media file: {}", e)))?;

    let builder = Response::builder()
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, MEDIA_CACHE_CONTROL)
        .header(header::CONTENT_TYPE, content_type_for(&file_path));

    match RangeRequest::from_header(headers.get(header::RANGE), size) {
        RangeRequest::Full => build_response(
            builder
                .status(StatusCode::OK)
                .header(header::CONTENT_LENGTH, size),
            Body::from_stream(ReaderStream::new(file)),
        ),
        RangeRequest::Partial { start, end } => {
            let length = end - start + 1;
            file.seek(SeekFrom::Start(start))
                .await
                .map_err(|e| AppError::Storage(format!("Failed to seek media file: {}", e)))?;

            build_response(
                builder
                    .status(StatusCode::PARTIAL_CONTENT)
                    .header(header::CONTENT_RANGE, format!("bytes {}-{}/{}", start, end, size))
                    .header(header::CONTENT_LENGTH, length),
                Body::from_stream(ReaderStream::new(file.take(length))),
            )
        }
        RangeRequest::Unsatisfiable => build_response(
            builder
                .status(StatusCode::RANGE_NOT_SATISFIABLE)
                .header(header::CONTENT_RANGE, format!("bytes */{}", size)),
            Body::empty(),
        ),
    }
}
