//! In-memory object store.
//!
//! Used when `storage.backend = "memory"` and by the test suites, which can
//! also make individual operations fail on demand.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::{ObjectStore, StorageError, StorageResult};

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    /// Object payload.
    pub data: Bytes,
    /// Content type recorded at put time.
    pub content_type: String,
}

/// Operations that can be forced to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Put,
    Get,
    Copy,
    Delete,
}

#[derive(Debug, Default)]
struct State {
    objects: HashMap<String, MemoryObject>,
    failing: HashSet<StoreOp>,
}

impl State {
    fn check(&self, op: StoreOp, key: &str) -> StorageResult<()> {
        if !self.failing.contains(&op) {
            return Ok(());
        }
        let msg = format!("injected failure for {key}");
        Err(match op {
            StoreOp::Put => StorageError::Put(msg),
            StoreOp::Get => StorageError::Get(msg),
            StoreOp::Copy => StorageError::Copy(msg),
            StoreOp::Delete => StorageError::Delete(msg),
        })
    }
}

/// Object store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `op` fail until cleared.
    pub async fn fail_on(&self, op: StoreOp) {
        self.state.write().await.failing.insert(op);
    }

    /// Stop failing `op`.
    pub async fn clear_failure(&self, op: StoreOp) {
        self.state.write().await.failing.remove(&op);
    }

    /// Inspect an object including its content type.
    pub async fn object(&self, key: &str) -> Option<MemoryObject> {
        self.state.read().await.objects.get(key).cloned()
    }

    /// Whether `key` exists.
    pub async fn contains(&self, key: &str) -> bool {
        self.state.read().await.objects.contains_key(key)
    }

    /// All keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.state.read().await.objects.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        tracing::debug!(key = %key, size = data.len(), "memory put");
        let mut state = self.state.write().await;
        state.check(StoreOp::Put, key)?;
        state.objects.insert(
            key.to_owned(),
            MemoryObject {
                data,
                content_type: content_type.to_owned(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let state = self.state.read().await;
        state.check(StoreOp::Get, key)?;
        state
            .objects
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_owned()))
    }

    async fn copy(&self, from: &str, to: &str) -> StorageResult<()> {
        tracing::debug!(from = %from, to = %to, "memory copy");
        let mut state = self.state.write().await;
        state.check(StoreOp::Copy, from)?;
        let object = state
            .objects
            .get(from)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(from.to_owned()))?;
        state.objects.insert(to.to_owned(), object);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        tracing::debug!(key = %key, "memory delete");
        let mut state = self.state.write().await;
        state.check(StoreOp::Delete, key)?;
        state.objects.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
