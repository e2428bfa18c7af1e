use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use clipshare_core::models::NewVideoView;
use clipshare_core::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{non_blank, parse_video_id};
use crate::constants::{MAX_SESSION_ID_LEN, VIEW_DEDUP_WINDOW_HOURS};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::DbState;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordViewRequest {
    /// Opaque client session token
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordViewResponse {
    pub ok: bool,
    /// Present when the view was already counted within the dedup window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduplicated: Option<bool>,
}

/// Validate a client session id: present, not blank, bounded.
pub(crate) fn require_session_id(session_id: Option<String>) -> Result<String, AppError> {
    let session_id = non_blank(session_id).ok_or(AppError::MissingSessionId)?;
    if session_id.chars().count() > MAX_SESSION_ID_LEN {
        return Err(AppError::InvalidInput(format!(
            "sessionId must be at most {} characters",
            MAX_SESSION_ID_LEN
        )));
    }
    Ok(session_id)
}

#[utoipa::path(
    post,
    path = "/videos/{id}/views",
    tag = "analytics",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body = RecordViewRequest,
    responses(
        (status = 200, description = "View counted or deduplicated", body = RecordViewResponse),
        (status = 400, description = "Missing or invalid sessionId", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(db, headers, request), fields(video_id = %id, operation = "record_view"))]
pub async fn record_view(
    Path(id): Path<String>,
    State(db): State<DbState>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<RecordViewRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let session_id = require_session_id(request.session_id)?;
    let video_id = parse_video_id(&id)?;

    if db.video_repository.find_video(video_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Video {} not found", video_id)).into());
    }

    let now = Utc::now();
    let since = now - Duration::hours(VIEW_DEDUP_WINDOW_HOURS);

    if db
        .analytics_repository
        .find_recent_view(video_id, &session_id, since)
        .await?
        .is_some()
    {
        tracing::debug!(video_id = %video_id, "View already counted in window");
        return Ok(Json(RecordViewResponse {
            ok: true,
            deduplicated: Some(true),
        }));
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    db.analytics_repository
        .record_view(&NewVideoView {
            video_id,
            session_id,
            user_agent,
            created_at: now,
        })
        .await?;

    Ok(Json(RecordViewResponse {
        ok: true,
        deduplicated: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_session_id() {
        assert_eq!(require_session_id(Some("s1".into())).unwrap(), "s1");
        assert!(matches!(
            require_session_id(None),
            Err(AppError::MissingSessionId)
        ));
        assert!(matches!(
            require_session_id(Some("  ".into())),
            Err(AppError::MissingSessionId)
        ));
        assert!(matches!(
            require_session_id(Some("x".repeat(MAX_SESSION_ID_LEN + 1))),
            Err(AppError::InvalidInput(_))
        ));
        assert!(require_session_id(Some("x".repeat(MAX_SESSION_ID_LEN))).is_ok());
    }

    #[test]
    fn test_response_omits_deduplicated_flag_for_new_views() {
        let json = serde_json::to_value(RecordViewResponse {
            ok: true,
            deduplicated: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "ok": true }));
    }
}
