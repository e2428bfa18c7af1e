//! Clipshare Storage Library
//!
//! This crate provides the blob store abstraction recordings are published through,
//! with implementations for the local filesystem and S3-compatible object storage.
//!
//! # Layout
//!
//! Both backends keep a local scratch area under the upload directory, because the
//! transcoder always needs a filesystem path to read from and write to:
//!
//! - **Raw uploads**: `{upload_dir}/raw/{id}.webm`
//! - **Processed output**: `{upload_dir}/videos/{id}.webm`
//!
//! Published objects use the key `videos/{id}.webm`. Key generation is centralized
//! in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod scratch;
pub mod traits;

// Re-export commonly used types
pub use clipshare_core::StorageBackend;
pub use factory::create_blob_store;
#[cfg(feature = "storage-local")]
pub use local::{resolve_within, LocalBlobStore};
#[cfg(feature = "storage-s3")]
pub use s3::S3BlobStore;
pub use scratch::ScratchSpace;
pub use traits::{BlobStore, StorageError, StorageResult};
