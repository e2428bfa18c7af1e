//! Clipshare API Library
//!
//! This crate provides the HTTP handlers, the upload pipeline, middleware and
//! application setup for the clipshare server.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
mod utils;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::UploadPipeline;
