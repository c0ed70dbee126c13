//! Bounded in-memory cache backend.
//!
//! [`CacheBackend`] behaves like a memcached node: keys are capped at 250
//! bytes by default, single items are capped at 1 MiB, and once the total
//! byte budget is exceeded entries are evicted by the `moka` cache's
//! admission and eviction policy. Eviction is transparent: an evicted key
//! simply reads as not found.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use moka::notification::RemovalCause;
use moka::sync::Cache;
use polykv_codec::Codec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BackendError, StoreError, StoreResult};
use crate::handle::StoreHandle;
use crate::traits::Backend;

const NAME: &str = "cache";

/// Options for a bounded cache store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Value encoding.
    pub codec: Codec,
    /// Total budget for keys plus values, in bytes.
    pub capacity_bytes: usize,
    /// Largest single encoded value accepted, in bytes.
    pub max_item_size: usize,
    /// Longest key accepted, in bytes.
    pub max_key_len: usize,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            codec: Codec::default(),
            capacity_bytes: 64 * 1024 * 1024, // 64 MiB
            max_item_size: 1024 * 1024,       // 1 MiB
            max_key_len: 250,
        }
    }
}

/// A store handle over a [`CacheBackend`].
pub type CacheStore = StoreHandle<CacheBackend>;

/// Open a bounded cache store.
pub fn open(options: CacheOptions) -> StoreResult<CacheStore> {
    let backend = CacheBackend::new(&options)?;
    Ok(StoreHandle::new(backend, options.codec))
}

/// Byte-weighted cache with capacity eviction.
///
/// Entries are weighed as key length plus value length. Eviction and the
/// size bookkeeping run as pending maintenance inside the cache, so
/// [`CacheBackend::len`] and [`CacheBackend::used_bytes`] flush that work
/// before reporting.
pub struct CacheBackend {
    entries: Cache<String, Arc<Vec<u8>>>,
    capacity_bytes: usize,
    max_item_size: usize,
    max_key_len: usize,
    evictions: Arc<AtomicU64>,
    closed: AtomicBool,
}

impl CacheBackend {
    /// Create an empty cache.
    pub fn new(options: &CacheOptions) -> StoreResult<Self> {
        if options.max_key_len == 0 {
            return Err(StoreError::Config("cache max_key_len must be positive".into()));
        }
        let largest_entry = options
            .max_item_size
            .checked_add(options.max_key_len)
            .ok_or_else(|| StoreError::Config("cache item limits overflow".into()))?;
        if options.capacity_bytes < largest_entry {
            return Err(StoreError::Config(format!(
                "cache capacity of {} bytes cannot hold a maximal item ({} + {} bytes)",
                options.capacity_bytes, options.max_key_len, options.max_item_size
            )));
        }

        let evictions = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&evictions);
        let entries = Cache::builder()
            .max_capacity(options.capacity_bytes as u64)
            .weigher(|key: &String, data: &Arc<Vec<u8>>| -> u32 {
                u32::try_from(key.len() + data.len()).unwrap_or(u32::MAX)
            })
            .eviction_listener(move |key: Arc<String>, _data, cause| {
                if cause == RemovalCause::Size {
                    counter.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "cache eviction");
                }
            })
            .build();

        Ok(Self {
            entries,
            capacity_bytes: options.capacity_bytes,
            max_item_size: options.max_item_size,
            max_key_len: options.max_key_len,
            evictions,
            closed: AtomicBool::new(false),
        })
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently charged against the capacity (keys plus values).
    pub fn used_bytes(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.weighted_size() as usize
    }

    /// Total number of entries evicted to stay within capacity.
    pub fn evictions(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.evictions.load(Ordering::Relaxed)
    }

    fn ensure_open(&self) -> Result<(), BackendError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BackendError::Closed { backend: NAME });
        }
        Ok(())
    }
}

impl Backend for CacheBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn max_key_len(&self) -> Option<usize> {
        Some(self.max_key_len)
    }

    fn put(&self, key: &str, data: Vec<u8>) -> Result<(), BackendError> {
        self.ensure_open()?;
        if data.len() > self.max_item_size {
            return Err(BackendError::ValueTooLarge {
                size: data.len(),
                max: self.max_item_size,
                backend: NAME,
            });
        }
        self.entries.insert(key.to_string(), Arc::new(data));
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        self.ensure_open()?;
        Ok(self.entries.get(key).map(|data| data.as_ref().clone()))
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.ensure_open()?;
        self.entries.invalidate(key);
        Ok(())
    }

    fn close(&self) -> Result<(), BackendError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        debug!(
            entries = self.entries.entry_count(),
            evictions = self.evictions.load(Ordering::Relaxed),
            "cache backend closed"
        );
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
        Ok(())
    }
}

impl std::fmt::Debug for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheBackend")
            .field("entry_count", &self.entries.entry_count())
            .field("used_bytes", &self.entries.weighted_size())
            .field("capacity_bytes", &self.capacity_bytes)
            .finish()
    }
}
