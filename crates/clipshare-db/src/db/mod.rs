//! Database repositories for data access layer
//!
//! Each repository owns one aggregate: `VideoRepository` the `videos` table,
//! `AnalyticsRepository` the `video_views` and `watch_sessions` tables. Methods
//! return `AppError` so handlers can propagate with `?`.

pub mod analytics;
pub mod video;

pub use analytics::AnalyticsRepository;
pub use video::VideoRepository;
