pub mod media_file;
pub mod video_get;
pub mod video_upload;
pub mod views;
pub mod watch_sessions;

use clipshare_core::AppError;
use uuid::Uuid;

/// Video ids arrive as raw path segments; anything that isn't a UUID names no video.
pub(crate) fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Video {} not found", raw)))
}

/// Treat an empty or whitespace-only string as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
