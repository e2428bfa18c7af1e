//! Clipshare database layer: PostgreSQL repositories for videos, views and watch sessions.

pub mod db;

pub use db::{AnalyticsRepository, VideoRepository};
