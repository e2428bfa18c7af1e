//! Clipshare Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by the storage, processing, database and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, ClipshareConfig, Config, ObjectStoreConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
