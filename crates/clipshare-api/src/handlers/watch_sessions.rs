use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use clipshare_core::models::{WatchProgress, WatchSessionUpsert};
use clipshare_core::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::views::require_session_id;
use super::{non_blank, parse_video_id};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::DbState;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WatchSessionRequest {
    pub session_id: Option<String>,
    /// Furthest playback position reached, in seconds
    pub watched_seconds: Option<f64>,
    /// Player-reported total duration, in seconds
    pub video_duration: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WatchSessionResponse {
    pub ok: bool,
    pub watched_percentage: f64,
}

impl WatchSessionRequest {
    /// Check presence and numeric ranges, collecting every missing field name.
    /// The video id is resolved last so body errors take precedence over 404.
    fn into_progress(self, raw_video_id: &str) -> Result<WatchProgress, AppError> {
        let session_id = non_blank(self.session_id);

        let mut missing = Vec::new();
        if session_id.is_none() {
            missing.push("sessionId".to_string());
        }
        if self.watched_seconds.is_none() {
            missing.push("watchedSeconds".to_string());
        }
        if self.video_duration.is_none() {
            missing.push("videoDuration".to_string());
        }

        let (Some(session_id), Some(watched_seconds), Some(video_duration)) =
            (session_id, self.watched_seconds, self.video_duration)
        else {
            return Err(AppError::MissingFields(missing));
        };

        let session_id = require_session_id(Some(session_id))?;

        if !watched_seconds.is_finite() || watched_seconds < 0.0 {
            return Err(AppError::InvalidInput(
                "watchedSeconds must be a finite number >= 0".to_string(),
            ));
        }
        if !video_duration.is_finite() || video_duration <= 0.0 {
            return Err(AppError::InvalidInput(
                "videoDuration must be a finite number > 0".to_string(),
            ));
        }

        Ok(WatchProgress {
            video_id: parse_video_id(raw_video_id)?,
            session_id,
            watched_seconds,
            video_duration,
        })
    }
}

#[utoipa::path(
    post,
    path = "/videos/{id}/watch-sessions",
    tag = "analytics",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body = WatchSessionRequest,
    responses(
        (status = 200, description = "Progress recorded", body = WatchSessionResponse),
        (status = 400, description = "Missing fields or invalid values", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(db, request), fields(video_id = %id, operation = "record_watch_session"))]
pub async fn record_watch_session(
    Path(id): Path<String>,
    State(db): State<DbState>,
    ValidatedJson(request): ValidatedJson<WatchSessionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let progress = request.into_progress(&id)?;
    let video_id = progress.video_id;

    if db.video_repository.find_video(video_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Video {} not found", video_id)).into());
    }

    let watched_percentage = progress.watched_percentage();

    let outcome = db.analytics_repository.upsert_watch_session(&progress).await?;
    if let WatchSessionUpsert::Unchanged(session) = &outcome {
        tracing::debug!(
            max_watched_seconds = session.max_watched_seconds,
            reported = progress.watched_seconds,
            "Watch progress did not advance"
        );
    }

    Ok(Json(WatchSessionResponse {
        ok: true,
        watched_percentage,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn some_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn request(
        session_id: Option<&str>,
        watched: Option<f64>,
        duration: Option<f64>,
    ) -> WatchSessionRequest {
        WatchSessionRequest {
            session_id: session_id.map(String::from),
            watched_seconds: watched,
            video_duration: duration,
        }
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let err = request(None, Some(1.0), None)
            .into_progress(&some_id())
            .unwrap_err();
        match err {
            AppError::MissingFields(fields) => {
                assert_eq!(fields, vec!["sessionId", "videoDuration"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let id = some_id();
        assert!(matches!(
            request(Some("s"), Some(-1.0), Some(10.0)).into_progress(&id),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            request(Some("s"), Some(1.0), Some(0.0)).into_progress(&id),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            request(Some("s"), Some(f64::NAN), Some(10.0)).into_progress(&id),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_valid_request_computes_percentage() {
        let progress = request(Some("s"), Some(30.0), Some(20.0))
            .into_progress(&some_id())
            .unwrap();
        assert_eq!(progress.watched_percentage(), 100.0);
    }

    #[test]
    fn test_body_errors_take_precedence_over_bad_id() {
        assert!(matches!(
            request(None, None, None).into_progress("nope"),
            Err(AppError::MissingFields(_))
        ));
        assert!(matches!(
            request(Some("s"), Some(1.0), Some(2.0)).into_progress("nope"),
            Err(AppError::NotFound(_))
        ));
    }
}
