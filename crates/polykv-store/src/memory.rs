//! In-memory backend.
//!
//! [`MemoryBackend`] keeps every entry in a `HashMap` behind a `RwLock`. It
//! is the reference backend: trivially correct, safe for concurrent use, and
//! suited to tests, embedding, and short-lived processes. Data is lost when
//! the backend is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use polykv_codec::Codec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BackendError, StoreResult};
use crate::handle::StoreHandle;
use crate::traits::Backend;

const NAME: &str = "memory";

/// Options for an in-memory store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryOptions {
    /// Value encoding.
    pub codec: Codec,
    /// Number of entries to reserve room for up front.
    pub initial_capacity: usize,
}

/// A store handle over a [`MemoryBackend`].
pub type MemoryStore = StoreHandle<MemoryBackend>;

/// Open an in-memory store.
pub fn open(options: MemoryOptions) -> StoreResult<MemoryStore> {
    let backend = MemoryBackend::with_capacity(options.initial_capacity);
    Ok(StoreHandle::new(backend, options.codec))
}

/// `HashMap`-based backend.
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    closed: AtomicBool,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty backend with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity)),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> Result<usize, BackendError> {
        Ok(self.read()?.len())
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> Result<bool, BackendError> {
        Ok(self.read()?.is_empty())
    }

    /// Sorted list of stored keys.
    pub fn keys(&self) -> Result<Vec<String>, BackendError> {
        let mut keys: Vec<String> = self.read()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn ensure_open(&self) -> Result<(), BackendError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BackendError::Closed { backend: NAME });
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Vec<u8>>>, BackendError> {
        self.entries
            .read()
            .map_err(|e| BackendError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<u8>>>, BackendError> {
        self.entries
            .write()
            .map_err(|e| BackendError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn put(&self, key: &str, data: Vec<u8>) -> Result<(), BackendError> {
        self.ensure_open()?;
        self.write()?.insert(key.to_string(), data);
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        self.ensure_open()?;
        Ok(self.read()?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.ensure_open()?;
        self.write()?.remove(key);
        Ok(())
    }

    fn close(&self) -> Result<(), BackendError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut map = self.write()?;
        debug!(entries = map.len(), "memory backend closed");
        map.clear();
        Ok(())
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("entry_count", &self.len().ok())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}
