//! Local filesystem storage backend.
//!
//! Used for development deployments and by the integration tests; writes
//! uploads under a base directory using the shared key layout.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::traits::{object_key, Storage, StorageResult};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await?;
        Ok(Self { base_path })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, folder: &str, filename: &str, data: Vec<u8>) -> StorageResult<String> {
        let key = object_key(folder, filename)?;
        let target = self.base_path.join(&key);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        let size = data.len();
        fs::write(&target, data).await?;

        let id = target.to_string_lossy().into_owned();
        tracing::debug!(path = %id, size = size, "Local upload complete");
        Ok(id)
    }
}
