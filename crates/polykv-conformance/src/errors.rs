//! Argument validation and codec failure paths.
//!
//! Every check here expects a specific error kind. Invalid arguments must
//! be rejected before the backend is touched, so a rejected write never
//! leaves anything behind.

use std::collections::HashMap;

use polykv_store::{Codec, Dest, Store, StoreError, ValidationError};

use crate::fixtures::{Foo, LengthlessSeq};

fn expect_validation(result: Result<impl std::fmt::Debug, StoreError>, expected: ValidationError) {
    match result {
        Err(err) => assert_eq!(
            err.validation(),
            Some(&expected),
            "expected {expected:?}, got {err}"
        ),
        Ok(v) => panic!("expected {expected:?}, got Ok({v:?})"),
    }
}

fn assert_absent<S: Store>(store: &S, key: &str) {
    let mut out = Foo::default();
    let found = store
        .get(key, &mut out)
        .unwrap_or_else(|e| panic!("get {key:?} failed: {e}"));
    assert!(!found, "a rejected write must not store anything under {key:?}");
}

/// Empty keys are rejected by every operation.
pub fn test_empty_keys<S: Store>(store: &S) {
    let mut out = Foo::default();
    expect_validation(store.set("", &Foo::new("bar")), ValidationError::EmptyKey);
    expect_validation(store.get("", &mut out), ValidationError::EmptyKey);
    expect_validation(store.delete(""), ValidationError::EmptyKey);
}

/// Nil values are rejected, through any number of transparent wrappers.
pub fn test_nil_values<S: Store>(store: &S) {
    expect_validation(store.set("nil", &None::<Foo>), ValidationError::NilValue);
    expect_validation(store.set("nil", &()), ValidationError::NilValue);
    expect_validation(store.set("nil", &Some(None::<Foo>)), ValidationError::NilValue);
    expect_validation(
        store.set("nil", &Box::new(None::<Foo>)),
        ValidationError::NilValue,
    );
    assert_absent(store, "nil");

    // Empty-but-present values are values.
    store
        .set("empty", &Foo::default())
        .unwrap_or_else(|e| panic!("empty struct rejected: {e}"));
    store
        .set("empty-list", &Vec::<u8>::new())
        .unwrap_or_else(|e| panic!("empty list rejected: {e}"));
}

/// Each kind of invalid read destination has its own error, and none of
/// them disturbs the stored value.
pub fn test_nil_destinations<S: Store>(store: &S) {
    let stored = Foo::new("bar");
    store.set("foo", &stored).unwrap_or_else(|e| panic!("{e}"));

    expect_validation(
        store.get_into::<Foo>("foo", Dest::Missing),
        ValidationError::MissingDestination,
    );
    expect_validation(
        store.get_into::<Foo>("foo", Dest::Untyped),
        ValidationError::UntypedDestination,
    );
    expect_validation(
        store.get_into::<Foo>("foo", Dest::from(None)),
        ValidationError::NullDestination,
    );
    // Destinations are checked even when the key holds nothing.
    expect_validation(
        store.get_into::<Foo>("absent", Dest::Null),
        ValidationError::NullDestination,
    );

    let mut out = Foo::default();
    assert!(store.get("foo", &mut out).unwrap_or_else(|e| panic!("{e}")));
    assert_eq!(out, stored);
}

/// A value the codec cannot represent fails as an encode error and is not
/// stored.
pub fn test_encode_errors<S: Store>(store: &S, codec: Codec) {
    let err = match codec {
        // JSON object keys must be strings.
        Codec::Json => {
            let value = HashMap::from([((1u8, 2u8), "pair".to_string())]);
            store.set("unencodable", &value)
        }
        // Bincode needs sequence lengths up front.
        Codec::Bincode => store.set("unencodable", &LengthlessSeq(vec![1, 2, 3])),
    }
    .expect_err("encoding must fail");
    assert!(err.is_encode(), "expected an encode error, got {err}");
    assert_absent(store, "unencodable");

    // JSON cannot spell NaN or infinity; writing null instead would lose data.
    if codec == Codec::Json {
        for err in [
            store.set("non-finite", &f64::NAN).expect_err("NaN must not encode"),
            store
                .set("non-finite", &vec![1.0, f64::INFINITY])
                .expect_err("infinity must not encode"),
        ] {
            assert!(err.is_encode(), "expected an encode error, got {err}");
        }
        assert_absent(store, "non-finite");
    }
}

/// Stored bytes that do not fit the destination type fail as a decode
/// error rather than a silent not-found.
pub fn test_decode_errors<S: Store>(store: &S) {
    store
        .set("foo", &Foo::new("bar"))
        .unwrap_or_else(|e| panic!("{e}"));
    let mut wrong = (0u64, 0u64);
    let err = store
        .get("foo", &mut wrong)
        .expect_err("decoding into the wrong type must fail");
    assert!(err.is_decode(), "expected a decode error, got {err}");
}

/// Keys up to `max_len` bytes work, one byte more is rejected by every
/// operation.
pub fn test_key_limit<S: Store>(store: &S, max_len: usize) {
    let longest = "k".repeat(max_len);
    let value = Foo::new("edge");
    store
        .set(&longest, &value)
        .unwrap_or_else(|e| panic!("key of {max_len} bytes rejected: {e}"));
    let mut out = Foo::default();
    assert!(store.get(&longest, &mut out).unwrap_or_else(|e| panic!("{e}")));
    assert_eq!(out, value);
    store.delete(&longest).unwrap_or_else(|e| panic!("{e}"));

    let too_long = "k".repeat(max_len + 1);
    for err in [
        store.set(&too_long, &value).expect_err("set must reject"),
        store.get(&too_long, &mut out).expect_err("get must reject"),
        store.delete(&too_long).expect_err("delete must reject"),
    ] {
        assert!(
            matches!(
                err.validation(),
                Some(ValidationError::KeyTooLong { len, max, .. })
                    if *len == max_len + 1 && *max == max_len
            ),
            "expected KeyTooLong, got {err}"
        );
    }
}
