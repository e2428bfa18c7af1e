//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use clipshare_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clipshare API",
        version = "0.1.0",
        description = "Screen recording upload, playback and watch analytics"
    ),
    paths(
        handlers::video_upload::upload_video,
        handlers::video_get::get_video,
        handlers::views::record_view,
        handlers::watch_sessions::record_watch_session,
        handlers::media_file::serve_media,
    ),
    components(
        schemas(
            models::Video,
            models::UploadedVideo,
            models::VideoAnalytics,
            models::VideoWithAnalytics,
            handlers::views::RecordViewRequest,
            handlers::views::RecordViewResponse,
            handlers::watch_sessions::WatchSessionRequest,
            handlers::watch_sessions::WatchSessionResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Recording upload and lookup"),
        (name = "analytics", description = "View counting and watch progress"),
        (name = "media", description = "Local media file serving")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_routes() {
        let spec = ApiDoc::openapi();
        for path in [
            "/videos",
            "/videos/{id}",
            "/videos/{id}/views",
            "/videos/{id}/watch-sessions",
            "/media/videos/{path}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
