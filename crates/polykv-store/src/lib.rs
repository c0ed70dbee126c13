//! Backend-agnostic key-value storage for PolyKV.
//!
//! Application code stores and retrieves structured values through the
//! [`Store`] contract. Persistence happens in a [`Backend`], and swapping one
//! backend for another changes only the [`StoreConfig`] used at construction.
//!
//! # Contract
//!
//! - `set(key, value)` encodes the value with the handle's [`Codec`] and
//!   replaces whatever the key held.
//! - `get(key, &mut out)` returns `Ok(false)` for a missing key; absence is
//!   not an error.
//! - `delete(key)` is idempotent.
//! - `close()` releases backend resources and may be called twice.
//! - Empty keys, nil values, and invalid destinations are rejected with a
//!   [`ValidationError`] before the backend is touched. Encode, decode, and
//!   backend failures each have their own [`StoreError`] variant.
//!
//! # Backends
//!
//! - [`MemoryBackend`] -- `HashMap` behind a `RwLock`
//! - [`FileBackend`] -- one checksummed file per key, atomic replacement
//! - [`CacheBackend`] -- bounded LRU cache with memcached-style limits
//!
//! # Example
//!
//! ```
//! use polykv_store::{memory, MemoryOptions, Store};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Foo {
//!     bar: String,
//! }
//!
//! let store = memory::open(MemoryOptions::default()).unwrap();
//! store.set("foo", &Foo { bar: "baz".into() }).unwrap();
//!
//! let mut out = Foo::default();
//! assert!(store.get("foo", &mut out).unwrap());
//! assert_eq!(out.bar, "baz");
//!
//! store.delete("foo").unwrap();
//! assert!(!store.get("foo", &mut out).unwrap());
//! ```

pub mod cache;
pub mod config;
pub mod dest;
pub mod error;
pub mod file;
pub mod handle;
pub mod memory;
pub mod traits;
pub mod validate;

// Re-export primary types at crate root for ergonomic imports.
pub use cache::{CacheBackend, CacheOptions, CacheStore};
pub use config::{BackendConfig, StoreConfig};
pub use dest::Dest;
pub use error::{BackendError, StoreError, StoreResult, ValidationError};
pub use file::{FileBackend, FileOptions, FileStore};
pub use handle::StoreHandle;
pub use memory::{MemoryBackend, MemoryOptions, MemoryStore};
pub use polykv_codec::{Codec, CodecError};
pub use traits::{Backend, Store};
pub use validate::{validate_destination, validate_key, validate_value};
