//! Object storage for upload payloads.
//!
//! The upload flows only need put, get, copy and delete on flat keys, so
//! the backends are hidden behind [`ObjectStore`].

mod memory;
mod s3;

pub use memory::{MemoryObject, MemoryStore, StoreOp};
pub use s3::S3Store;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};

/// Object storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The key does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Writing an object failed.
    #[error("put failed: {0}")]
    Put(String),

    /// Reading an object failed.
    #[error("get failed: {0}")]
    Get(String),

    /// Server-side copy failed.
    #[error("copy failed: {0}")]
    Copy(String),

    /// Deleting an object failed.
    #[error("delete failed: {0}")]
    Delete(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A flat key/value object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Read the object at `key`.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Copy the object at `from` to `to`.
    async fn copy(&self, from: &str, to: &str) -> StorageResult<()>;

    /// Delete the object at `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Shared handle to the configured object store.
pub type SharedStore = Arc<dyn ObjectStore>;

/// Build the object store selected in the configuration.
pub async fn build_store(config: &StorageConfig) -> SharedStore {
    match config.backend {
        StorageBackend::S3 => Arc::new(S3Store::from_config(config).await),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory object storage; uploads are lost on restart");
            Arc::new(MemoryStore::new())
        }
    }
}
