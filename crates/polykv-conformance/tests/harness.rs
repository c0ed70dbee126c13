//! The suite must catch stores that break the contract.

use std::collections::HashMap;
use std::sync::Mutex;

use polykv_conformance::{test_store, test_concurrent_interactions, Codec};
use polykv_store::{Backend, BackendError, StoreHandle};

/// Keeps every write, ignores deletes.
#[derive(Default)]
struct StickyBackend {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl Backend for StickyBackend {
    fn name(&self) -> &'static str {
        "sticky"
    }

    fn put(&self, key: &str, data: Vec<u8>) -> Result<(), BackendError> {
        self.entries.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn remove(&self, _key: &str) -> Result<(), BackendError> {
        Ok(())
    }

    fn close(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Accepts writes and forgets them.
struct BlackHole;

impl Backend for BlackHole {
    fn name(&self) -> &'static str {
        "black-hole"
    }

    fn put(&self, _key: &str, _data: Vec<u8>) -> Result<(), BackendError> {
        Ok(())
    }

    fn fetch(&self, _key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(None)
    }

    fn remove(&self, _key: &str) -> Result<(), BackendError> {
        Ok(())
    }

    fn close(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

#[test]
#[should_panic(expected = "a deleted key must read as not found")]
fn ignored_deletes_are_caught() {
    let store = StoreHandle::new(StickyBackend::default(), Codec::Json);
    test_store(&store);
}

#[test]
#[should_panic(expected = "a stored value must be found")]
fn lost_writes_are_caught() {
    let store = StoreHandle::new(BlackHole, Codec::Bincode);
    test_store(&store);
}

#[test]
#[should_panic]
fn lost_writes_fail_the_storm() {
    let store = StoreHandle::new(BlackHole, Codec::Json);
    test_concurrent_interactions(&store, 8);
}
