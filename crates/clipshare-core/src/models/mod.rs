pub mod analytics;
pub mod video;

pub use analytics::{
    watch_percentage, NewVideoView, VideoAnalytics, VideoView, WatchProgress, WatchSession,
    WatchSessionUpsert,
};
pub use video::{
    NewVideo, UploadedVideo, Video, VideoWithAnalytics, VIDEO_CONTENT_TYPE, VIDEO_EXTENSION,
};
