use std::fmt;

use polykv_codec::Codec;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::dest::Dest;
use crate::error::{StoreError, StoreResult};
use crate::traits::{Backend, Store};
use crate::validate::{validate_destination, validate_key_with_limit, validate_value};

/// A store handle: one backend, one codec, for the handle's whole life.
///
/// `StoreHandle` is the [`Store`] implementation every backend is reached
/// through. It validates arguments, applies the codec, and forwards raw
/// bytes to the backend. The default type parameter gives a handle whose
/// backend was chosen at runtime.
pub struct StoreHandle<B: Backend = Box<dyn Backend>> {
    backend: B,
    codec: Codec,
}

impl<B: Backend> StoreHandle<B> {
    /// Bind `backend` to `codec`.
    pub fn new(backend: B, codec: Codec) -> Self {
        debug!(backend = backend.name(), %codec, "store handle created");
        Self { backend, codec }
    }

    /// The codec values are encoded with.
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read and decode the value stored under `key`, if any.
    pub fn fetch<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        self.check_key(key)?;
        match self.backend.fetch(key)? {
            Some(data) => self
                .codec
                .unmarshal(&data)
                .map(Some)
                .map_err(StoreError::Decode),
            None => Ok(None),
        }
    }

    /// Erase the backend type.
    pub fn boxed(self) -> StoreHandle
    where
        B: 'static,
    {
        StoreHandle {
            backend: Box::new(self.backend),
            codec: self.codec,
        }
    }

    fn check_key(&self, key: &str) -> StoreResult<()> {
        validate_key_with_limit(key, self.backend.max_key_len(), self.backend.name())?;
        Ok(())
    }
}

impl<B: Backend> Store for StoreHandle<B> {
    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        self.check_key(key)?;
        validate_value(value)?;
        let data = self.codec.marshal(value).map_err(StoreError::Encode)?;
        debug!(backend = self.backend.name(), key, size = data.len(), "set");
        self.backend.put(key, data)?;
        Ok(())
    }

    fn get_into<T: DeserializeOwned>(&self, key: &str, dest: Dest<'_, T>) -> StoreResult<bool> {
        self.check_key(key)?;
        let slot = validate_destination(dest)?;
        let Some(data) = self.backend.fetch(key)? else {
            debug!(backend = self.backend.name(), key, "get: not found");
            return Ok(false);
        };
        self.codec
            .unmarshal_into(&data, slot)
            .map_err(StoreError::Decode)?;
        Ok(true)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.check_key(key)?;
        debug!(backend = self.backend.name(), key, "delete");
        self.backend.remove(key)?;
        Ok(())
    }

    fn close(&self) -> StoreResult<()> {
        debug!(backend = self.backend.name(), "closing store");
        self.backend.close()?;
        Ok(())
    }
}

impl<B: Backend> fmt::Debug for StoreHandle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("backend", &self.backend.name())
            .field("codec", &self.codec)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::error::{BackendError, ValidationError};
    use crate::memory::MemoryBackend;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Foo {
        bar: String,
    }

    /// Backend that fails every operation, to check nothing reaches it.
    struct Unreachable;

    impl Backend for Unreachable {
        fn name(&self) -> &'static str {
            "unreachable"
        }

        fn max_key_len(&self) -> Option<usize> {
            Some(8)
        }

        fn put(&self, _key: &str, _data: Vec<u8>) -> Result<(), BackendError> {
            panic!("put must not be reached")
        }

        fn fetch(&self, _key: &str) -> Result<Option<Vec<u8>>, BackendError> {
            panic!("fetch must not be reached")
        }

        fn remove(&self, _key: &str) -> Result<(), BackendError> {
            panic!("remove must not be reached")
        }

        fn close(&self) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn memory(codec: Codec) -> StoreHandle<MemoryBackend> {
        StoreHandle::new(MemoryBackend::new(), codec)
    }

    #[test]
    fn scenario_set_get_delete() {
        let store = memory(Codec::Json);
        store.set("foo", &Foo { bar: "baz".into() }).unwrap();

        let mut out = Foo::default();
        assert!(store.get("foo", &mut out).unwrap());
        assert_eq!(out.bar, "baz");

        store.delete("foo").unwrap();
        assert!(!store.get("foo", &mut out).unwrap());
    }

    #[test]
    fn stored_bytes_use_the_handle_codec() {
        let store = memory(Codec::Json);
        store.set("foo", &Foo { bar: "baz".into() }).unwrap();
        let raw = store.backend().fetch("foo").unwrap().unwrap();
        assert_eq!(raw, br#"{"bar":"baz"}"#);
    }

    #[test]
    fn validation_happens_before_the_backend() {
        let store = StoreHandle::new(Unreachable, Codec::Json);
        let foo = Foo { bar: "baz".into() };
        let mut out = Foo::default();

        assert!(store.set("", &foo).unwrap_err().is_validation());
        assert!(store.set("foo", &None::<Foo>).unwrap_err().is_validation());
        assert!(store.set("too-long-key", &foo).unwrap_err().is_validation());
        assert!(store.get("", &mut out).unwrap_err().is_validation());
        assert!(store.get_into::<Foo>("foo", Dest::Null).unwrap_err().is_validation());
        assert!(store.delete("").unwrap_err().is_validation());
        assert!(store.fetch::<Foo>("").unwrap_err().is_validation());
    }

    #[test]
    fn encode_failure_is_not_a_backend_failure() {
        let store = StoreHandle::new(Unreachable, Codec::Json);
        let mut map = std::collections::HashMap::new();
        map.insert((1u8, 2u8), 3u8);
        let err = store.set("map", &map).unwrap_err();
        assert!(err.is_encode(), "{err}");
    }

    #[test]
    fn decode_failure_is_reported() {
        let store = memory(Codec::Bincode);
        store.set("foo", &Foo { bar: "baz".into() }).unwrap();
        let mut wrong = 0u64;
        let err = store.get("foo", &mut wrong).unwrap_err();
        assert!(err.is_decode(), "{err}");
    }

    #[test]
    fn fetch_returns_typed_values() {
        let store = memory(Codec::Bincode);
        assert_eq!(store.fetch::<Foo>("foo").unwrap(), None);
        store.set("foo", &Foo { bar: "baz".into() }).unwrap();
        assert_eq!(
            store.fetch::<Foo>("foo").unwrap(),
            Some(Foo { bar: "baz".into() })
        );
    }

    #[test]
    fn destination_errors_are_distinct() {
        let store = memory(Codec::Json);
        store.set("foo", &Foo { bar: "baz".into() }).unwrap();

        let missing = store.get_into::<Foo>("foo", Dest::Missing).unwrap_err();
        let untyped = store.get_into::<Foo>("foo", Dest::Untyped).unwrap_err();
        let null = store.get_into::<Foo>("foo", Dest::from(None)).unwrap_err();

        assert_eq!(missing.validation(), Some(&ValidationError::MissingDestination));
        assert_eq!(untyped.validation(), Some(&ValidationError::UntypedDestination));
        assert_eq!(null.validation(), Some(&ValidationError::NullDestination));
    }

    #[test]
    fn boxed_handle_behaves_the_same() {
        let store: StoreHandle = memory(Codec::Json).boxed();
        store.set("foo", &Foo { bar: "baz".into() }).unwrap();
        let mut out = Foo::default();
        assert!(store.get("foo", &mut out).unwrap());
        assert_eq!(out.bar, "baz");
        assert_eq!(store.backend().name(), "memory");
    }

    #[test]
    fn debug_format() {
        let store = memory(Codec::Bincode);
        let debug = format!("{store:?}");
        assert!(debug.contains("StoreHandle"));
        assert!(debug.contains("memory"));
        assert!(debug.contains("Bincode"));
    }
}
