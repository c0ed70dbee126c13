//! The core scenario every backend must pass.

use polykv_store::Store;

use crate::fixtures::Foo;

/// Absence, store, read back, overwrite, delete, absence again.
pub fn test_store<S: Store>(store: &S) {
    let key = "foo";
    let mut out = Foo::default();

    // A fresh key holds nothing.
    let found = store
        .get(key, &mut out)
        .unwrap_or_else(|e| panic!("get of a fresh key failed: {e}"));
    assert!(!found, "a fresh key must read as not found");

    let expected = Foo::new("baz");
    store
        .set(key, &expected)
        .unwrap_or_else(|e| panic!("set failed: {e}"));

    let found = store
        .get(key, &mut out)
        .unwrap_or_else(|e| panic!("get after set failed: {e}"));
    assert!(found, "a stored value must be found");
    assert_eq!(out, expected);

    let replacement = Foo::new("qux");
    store
        .set(key, &replacement)
        .unwrap_or_else(|e| panic!("overwrite failed: {e}"));
    let mut out = Foo::default();
    assert!(store.get(key, &mut out).unwrap_or_else(|e| panic!("{e}")));
    assert_eq!(out, replacement, "set must replace the previous value");

    store
        .delete(key)
        .unwrap_or_else(|e| panic!("delete failed: {e}"));
    let found = store
        .get(key, &mut out)
        .unwrap_or_else(|e| panic!("get after delete failed: {e}"));
    assert!(!found, "a deleted key must read as not found");
}

/// Not-found reads leave the destination untouched.
pub fn test_absent_key<S: Store>(store: &S) {
    let mut out = Foo::new("untouched");
    let found = store
        .get("absent", &mut out)
        .unwrap_or_else(|e| panic!("get of an absent key failed: {e}"));
    assert!(!found);
    assert_eq!(out, Foo::new("untouched"));
}

/// Deleting a key that was never written is not an error, nor is
/// deleting twice.
pub fn test_delete_missing<S: Store>(store: &S) {
    store
        .delete("never-written")
        .unwrap_or_else(|e| panic!("delete of a missing key failed: {e}"));

    store.set("once", &Foo::new("x")).unwrap_or_else(|e| panic!("{e}"));
    store.delete("once").unwrap_or_else(|e| panic!("{e}"));
    store
        .delete("once")
        .unwrap_or_else(|e| panic!("second delete failed: {e}"));
}

/// Keys are independent of each other.
pub fn test_key_isolation<S: Store>(store: &S) {
    let keys = ["a", "b", "a/b", "a b", "ключ", "🔑"];
    for (i, key) in keys.iter().enumerate() {
        store
            .set(key, &Foo::new(format!("value-{i}")))
            .unwrap_or_else(|e| panic!("set {key:?} failed: {e}"));
    }
    store.delete("a").unwrap_or_else(|e| panic!("{e}"));

    let mut out = Foo::default();
    assert!(!store.get("a", &mut out).unwrap_or_else(|e| panic!("{e}")));
    for (i, key) in keys.iter().enumerate().skip(1) {
        let found = store
            .get(key, &mut out)
            .unwrap_or_else(|e| panic!("get {key:?} failed: {e}"));
        assert!(found, "{key:?} must survive deleting another key");
        assert_eq!(out, Foo::new(format!("value-{i}")));
    }
}

/// A freshly opened store closes cleanly.
pub fn test_close<S: Store>(store: &S) {
    store.set("foo", &Foo::new("bar")).unwrap_or_else(|e| panic!("{e}"));
    store
        .close()
        .unwrap_or_else(|e| panic!("close failed: {e}"));
}
