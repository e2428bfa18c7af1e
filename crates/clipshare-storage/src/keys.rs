//! Shared key generation for storage backends.
//!
//! Key format: `videos/{id}.webm`. The same string is the object key on S3 and the
//! path relative to the upload directory on the local backend.

use clipshare_core::models::VIDEO_EXTENSION;
use uuid::Uuid;

/// Directory (and key prefix) processed recordings live under.
pub const VIDEOS_PREFIX: &str = "videos";

/// Directory raw uploads are written to before processing.
pub const RAW_PREFIX: &str = "raw";

/// Canonical filename for a video.
pub fn video_filename(id: Uuid) -> String {
    format!("{}.{}", id, VIDEO_EXTENSION)
}

/// Canonical storage key for a video.
pub fn video_key(id: Uuid) -> String {
    format!("{}/{}", VIDEOS_PREFIX, video_filename(id))
}
