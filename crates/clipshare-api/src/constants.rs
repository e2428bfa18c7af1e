//! Application-wide constants.

/// Rolling window in which repeat views from one session are not counted again.
pub const VIEW_DEDUP_WINDOW_HOURS: i64 = 24;

/// Longest accepted client session token.
pub const MAX_SESSION_ID_LEN: usize = 256;

/// Duration stored when neither ffprobe nor the trim range yields one.
pub const DEFAULT_DURATION_SECONDS: f64 = 10.0;

/// Multipart framing allowance added on top of the file size limit.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Extra time the HTTP timeout layer grants beyond the processing timeout.
pub const HTTP_TIMEOUT_GRACE_SECS: u64 = 5;

/// Route prefix locally stored media is served under.
pub const MEDIA_ROUTE_PREFIX: &str = "/media/videos";

/// Published files are immutable: a new upload always gets a new id.
pub const MEDIA_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
