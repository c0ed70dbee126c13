//! The two seams of the crate.
//!
//! [`Backend`] is what a storage technology implements: raw bytes in, raw
//! bytes out, object-safe so a backend can be picked at runtime. [`Store`] is
//! what application code calls: typed values, validated and encoded with the
//! handle's codec before they ever reach a backend.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::dest::Dest;
use crate::error::{BackendError, StoreResult};

/// A byte-level key-value backend.
///
/// Implementations must satisfy these invariants:
/// - Every method is safe to call concurrently through a shared reference.
/// - `put` overwrites atomically: a concurrent `fetch` observes either the
///   old bytes or the new bytes, never a mixture.
/// - `fetch` reports a missing key as `Ok(None)`, never as an error.
/// - `remove` of a missing key succeeds.
/// - `close` may be called more than once; calls after the first are no-ops.
///
/// Keys reaching a backend are already validated (non-empty and within
/// [`Backend::max_key_len`]).
pub trait Backend: Send + Sync {
    /// Short backend name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Longest key, in bytes, this backend accepts. `None` means unbounded.
    fn max_key_len(&self) -> Option<usize> {
        None
    }

    /// Store `data` under `key`, replacing any previous bytes.
    fn put(&self, key: &str, data: Vec<u8>) -> Result<(), BackendError>;

    /// Read the bytes stored under `key`.
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Remove whatever is stored under `key`.
    fn remove(&self, key: &str) -> Result<(), BackendError>;

    /// Release backend resources.
    fn close(&self) -> Result<(), BackendError>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn max_key_len(&self) -> Option<usize> {
        (**self).max_key_len()
    }

    fn put(&self, key: &str, data: Vec<u8>) -> Result<(), BackendError> {
        (**self).put(key, data)
    }

    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        (**self).fetch(key)
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        (**self).remove(key)
    }

    fn close(&self) -> Result<(), BackendError> {
        (**self).close()
    }
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn max_key_len(&self) -> Option<usize> {
        (**self).max_key_len()
    }

    fn put(&self, key: &str, data: Vec<u8>) -> Result<(), BackendError> {
        (**self).put(key, data)
    }

    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        (**self).fetch(key)
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        (**self).remove(key)
    }

    fn close(&self) -> Result<(), BackendError> {
        (**self).close()
    }
}

/// The key-value store contract.
///
/// Uniform across backends: swapping the backend behind a store changes
/// nothing about how these methods behave.
///
/// - A missing key is not an error. [`Store::get`] returns `Ok(false)`.
/// - [`Store::delete`] of a missing key succeeds.
/// - Empty keys, nil values, and invalid destinations fail with
///   [`StoreError::Validation`](crate::StoreError::Validation) before the
///   backend is touched.
/// - Implementations are `Send + Sync`; callers never synchronize.
pub trait Store: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// The key must not be empty and the value must not be nil.
    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()>;

    /// Decode the value stored under `key` into `dest`.
    ///
    /// Returns `Ok(true)` if a value was found and decoded, `Ok(false)` if
    /// the key holds nothing. On any error the contents of the destination
    /// must not be relied on.
    fn get_into<T: DeserializeOwned>(&self, key: &str, dest: Dest<'_, T>) -> StoreResult<bool>;

    /// Remove the value stored under `key`.
    ///
    /// Deleting a key that holds nothing is not an error.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Release the store's backend resources.
    fn close(&self) -> StoreResult<()>;

    /// Decode the value stored under `key` into `out`.
    ///
    /// Shorthand for [`Store::get_into`] with a [`Dest::Slot`].
    fn get<T: DeserializeOwned>(&self, key: &str, out: &mut T) -> StoreResult<bool> {
        self.get_into(key, Dest::Slot(out))
    }
}
