//! Picrelay Storage Library
//!
//! Storage abstraction and backends for uploaded images. The worker talks to
//! the [`Storage`] trait; the factory picks a backend from configuration.
//!
//! # Object key format
//!
//! All backends store an upload under `{folder}/{filename}` where `folder` is
//! the configured destination folder identifier. Keys must not contain `..`
//! or a leading `/`.

pub mod factory;
pub mod local;
pub mod s3;
pub mod traits;

pub use factory::create_storage;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
