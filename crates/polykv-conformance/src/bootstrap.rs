//! Opening a store over storage that does not exist yet.

use std::path::Path;

use polykv_store::Store;

use crate::fixtures::Foo;

/// Open a store rooted at a nested, not yet existing path and check that
/// opening creates it and the store works immediately.
///
/// `open` receives the path to use and must return an open store.
pub fn test_bootstrap<S, F>(open: F)
where
    S: Store,
    F: FnOnce(&Path) -> S,
{
    let root = tempfile::tempdir().unwrap_or_else(|e| panic!("creating a temp dir failed: {e}"));
    let target = root.path().join("does").join("not").join("exist");
    assert!(!target.exists());

    let store = open(&target);
    assert!(target.is_dir(), "opening must create {}", target.display());

    let value = Foo::new("bootstrapped");
    store
        .set("foo", &value)
        .unwrap_or_else(|e| panic!("set on a bootstrapped store failed: {e}"));
    let mut out = Foo::default();
    assert!(store.get("foo", &mut out).unwrap_or_else(|e| panic!("{e}")));
    assert_eq!(out, value);
    store.close().unwrap_or_else(|e| panic!("{e}"));
}
