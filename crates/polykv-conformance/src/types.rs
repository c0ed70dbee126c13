//! Round trips across the value shapes applications store.
//!
//! Both codecs must carry scalars, strings, bytes, collections, options,
//! boxes, tuples, arrays, and enums. Some shapes only one codec supports;
//! those are checked under that codec alone.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Debug;

use polykv_store::{Codec, Store};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::fixtures::{Bundle, Foo, Marker, Mode};

/// Store `value` under `key` and check it reads back equal.
pub fn assert_round_trip<S, T>(store: &S, key: &str, value: &T)
where
    S: Store,
    T: Serialize + DeserializeOwned + PartialEq + Debug + Default,
{
    store
        .set(key, value)
        .unwrap_or_else(|e| panic!("set {key:?} ({value:?}) failed: {e}"));
    let mut out = T::default();
    let found = store
        .get(key, &mut out)
        .unwrap_or_else(|e| panic!("get {key:?} failed: {e}"));
    assert!(found, "{key:?} must be found after set");
    assert_eq!(&out, value, "{key:?} must read back what was stored");
}

/// Check every value shape `codec` supports.
pub fn test_types<S: Store>(store: &S, codec: Codec) {
    test_common_types(store);
    match codec {
        Codec::Json => test_json_only_types(store),
        Codec::Bincode => test_bincode_only_types(store),
    }
}

/// Shapes both codecs carry.
pub fn test_common_types<S: Store>(store: &S) {
    assert_round_trip(store, "bool", &true);
    assert_round_trip(store, "i8", &-8i8);
    assert_round_trip(store, "i16", &-1600i16);
    assert_round_trip(store, "i32", &i32::MIN);
    assert_round_trip(store, "i64", &i64::MIN);
    assert_round_trip(store, "u8", &u8::MAX);
    assert_round_trip(store, "u16", &u16::MAX);
    assert_round_trip(store, "u32", &u32::MAX);
    assert_round_trip(store, "u64", &u64::MAX);
    assert_round_trip(store, "f32", &1.5f32);
    assert_round_trip(store, "f64", &-2.75f64);
    assert_round_trip(store, "char", &'⚡');
    assert_round_trip(store, "string", &"foo".to_string());
    assert_round_trip(store, "empty-string", &String::new());
    assert_round_trip(store, "bytes", &b"foo\0bar".to_vec());
    assert_round_trip(store, "array", &[1u16, 2, 3, 4]);
    assert_round_trip(store, "tuple", &(7i32, "seven".to_string(), false));
    assert_round_trip(store, "struct", &Foo::new("baz"));
    assert_round_trip(store, "boxed", &Box::new(Foo::new("boxed")));
    assert_round_trip(store, "option", &Some(Foo::new("inside")));
    assert_round_trip(store, "unit-struct", &Marker);
    assert_round_trip(
        store,
        "struct-list",
        &vec![Foo::new("a"), Foo::new("b"), Foo::new("c")],
    );
    assert_round_trip(
        store,
        "string-map",
        &HashMap::from([
            ("k1".to_string(), "v1".to_string()),
            ("k2".to_string(), "v2".to_string()),
        ]),
    );
    assert_round_trip(
        store,
        "int-map",
        &BTreeMap::from([(1u32, "one".to_string()), (2, "two".to_string())]),
    );
    assert_round_trip(
        store,
        "set",
        &HashSet::from(["x".to_string(), "y".to_string()]),
    );
    assert_round_trip(store, "enum-unit", &Mode::Off);
    assert_round_trip(store, "enum-newtype", &Mode::Level(9));
    assert_round_trip(
        store,
        "enum-struct",
        &Mode::Custom {
            name: "n".into(),
            weight: -3,
        },
    );
    assert_round_trip(store, "nested", &Bundle::sample());
}

/// Shapes only a self-describing encoding can carry.
pub fn test_json_only_types<S: Store>(store: &S) {
    let value = serde_json::json!({
        "name": "dynamic",
        "tags": ["a", "b"],
        "nested": { "n": 1, "ok": true, "none": null },
    });
    assert_round_trip(store, "dynamic", &value);
}

/// Shapes only the binary encoding can carry.
pub fn test_bincode_only_types<S: Store>(store: &S) {
    assert_round_trip(
        store,
        "tuple-keyed-map",
        &BTreeMap::from([((1u8, 2u8), "a".to_string()), ((3, 4), "b".to_string())]),
    );
    assert_round_trip(
        store,
        "bytes-keyed-map",
        &BTreeMap::from([(vec![0u8, 1], 10u32), (vec![2], 20)]),
    );
    assert_round_trip(
        store,
        "extreme-floats",
        &vec![f64::MAX, f64::MIN_POSITIVE, f64::INFINITY, f64::NEG_INFINITY],
    );
}
