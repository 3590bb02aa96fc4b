//! Picrelay Core Library
//!
//! This crate provides the domain models, the pure filename derivation logic,
//! and the configuration that are shared across all Picrelay components.

pub mod config;
pub mod models;
pub mod naming;

// Re-export commonly used types
pub use config::{Config, EnrichmentShape, StorageBackend};
pub use models::{ChangeEvent, ImageKind, SessionRecord};
pub use naming::{derive, derive_now, original_token, DerivedFilename};
