//! Domain route groups (videos, analytics, media).

use crate::constants::{MEDIA_ROUTE_PREFIX, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn video_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let body_limit = state
        .media
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/videos",
            post(handlers::video_upload::upload_video)
                .layer(DefaultBodyLimit::max(usize::try_from(body_limit).unwrap_or(usize::MAX))),
        )
        .route("/videos/{id}", get(handlers::video_get::get_video))
}

pub fn analytics_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos/{id}/views", post(handlers::views::record_view))
        .route(
            "/videos/{id}/watch-sessions",
            post(handlers::watch_sessions::record_watch_session),
        )
}

pub fn media_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        &format!("{}/{{*path}}", MEDIA_ROUTE_PREFIX),
        get(handlers::media_file::serve_media),
    )
}
