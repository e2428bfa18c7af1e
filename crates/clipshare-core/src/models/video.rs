use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::analytics::VideoAnalytics;

/// Container type every stored recording is remuxed into.
pub const VIDEO_CONTENT_TYPE: &str = "video/webm";
pub const VIDEO_EXTENSION: &str = "webm";

/// A published recording. Rows exist only once the media bytes are durably stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    /// Duration in seconds, always > 0
    pub duration: f64,
    pub size_bytes: i64,
    pub public_url: String,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a video row; the repository sets view count and timestamps.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub duration: f64,
    pub size_bytes: i64,
    pub public_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoWithAnalytics {
    pub video: Video,
    pub analytics: VideoAnalytics,
}

/// Success payload of an upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedVideo {
    pub video_id: Uuid,
    pub public_url: String,
    pub duration: f64,
    pub size_bytes: i64,
    pub watch_page_url: String,
}

impl UploadedVideo {
    pub fn new(video: &Video, public_base_url: &str) -> Self {
        Self {
            video_id: video.id,
            public_url: video.public_url.clone(),
            duration: video.duration,
            size_bytes: video.size_bytes,
            watch_page_url: format!("{}/watch/{}", public_base_url.trim_end_matches('/'), video.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_video() -> Video {
        let now = Utc::now();
        let id = Uuid::new_v4();
        Video {
            id,
            filename: format!("{}.webm", id),
            content_type: VIDEO_CONTENT_TYPE.to_string(),
            duration: 8.0,
            size_bytes: 1024,
            public_url: format!("http://localhost:3000/media/videos/{}.webm", id),
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_video_serializes_camel_case() {
        let video = sample_video();
        let json = serde_json::to_value(&video).unwrap();
        assert_eq!(json["contentType"], "video/webm");
        assert_eq!(json["sizeBytes"], 1024);
        assert_eq!(json["viewCount"], 0);
        assert!(json.get("publicUrl").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_uploaded_video_watch_page_url() {
        let video = sample_video();
        let uploaded = UploadedVideo::new(&video, "https://clips.example.com/");
        assert_eq!(
            uploaded.watch_page_url,
            format!("https://clips.example.com/watch/{}", video.id)
        );
        let json = serde_json::to_value(&uploaded).unwrap();
        assert_eq!(json["videoId"], video.id.to_string());
        assert_eq!(json["duration"], 8.0);
    }
}
