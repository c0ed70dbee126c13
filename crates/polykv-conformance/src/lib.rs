//! Conformance suite for PolyKV stores.
//!
//! Any [`Store`](polykv_store::Store) implementation can prove it honors
//! the store contract by running these checks. Each check is a plain
//! function over `&impl Store` that panics on the first violation, so the
//! suite works from any test harness.
//!
//! The [`conformance_tests!`] macro generates one `#[test]` per check and
//! codec from a factory function:
//!
//! ```ignore
//! use polykv_conformance::conformance_tests;
//! use polykv_store::{memory, Codec, MemoryOptions, MemoryStore};
//!
//! fn open_store(codec: Codec) -> (MemoryStore, ()) {
//!     let store = memory::open(MemoryOptions { codec, ..Default::default() }).unwrap();
//!     (store, ())
//! }
//!
//! conformance_tests!(open_store);
//! ```
//!
//! The factory returns the store plus a guard kept alive for the length of
//! the test (a temporary directory, for instance).

pub mod bootstrap;
pub mod concurrency;
pub mod errors;
pub mod fixtures;
pub mod suite;
pub mod types;

pub use polykv_store::{Codec, Store};

pub use bootstrap::test_bootstrap;
pub use concurrency::{test_concurrent_interactions, DEFAULT_CALLER_COUNT};
pub use errors::{
    test_decode_errors, test_empty_keys, test_encode_errors, test_key_limit,
    test_nil_destinations, test_nil_values,
};
pub use suite::{test_absent_key, test_close, test_delete_missing, test_key_isolation, test_store};
pub use types::test_types;

/// Run every single-store check against `store` in sequence.
///
/// The concurrency storm is left out; run
/// [`test_concurrent_interactions`] separately.
pub fn run_all<S: Store>(store: &S, codec: Codec) {
    test_store(store);
    test_absent_key(store);
    test_delete_missing(store);
    test_key_isolation(store);
    test_types(store, codec);
    test_empty_keys(store);
    test_nil_values(store);
    test_nil_destinations(store);
    test_encode_errors(store, codec);
    test_decode_errors(store);
}

/// Generate the conformance tests for a store factory.
///
/// `$factory` is any expression callable as `Fn(Codec) -> (S, G)`. Tests
/// are grouped into a `json` and a `bincode` module. With
/// `max_key_len = N` the key-length limit is checked as well.
#[macro_export]
macro_rules! conformance_tests {
    (@codec $module:ident, $codec:expr, $factory:expr) => {
        mod $module {
            #[allow(unused_imports)]
            use super::*;

            #[test]
            fn store() {
                let (store, _guard) = ($factory)($codec);
                $crate::test_store(&store);
            }

            #[test]
            fn absent_key() {
                let (store, _guard) = ($factory)($codec);
                $crate::test_absent_key(&store);
            }

            #[test]
            fn delete_missing() {
                let (store, _guard) = ($factory)($codec);
                $crate::test_delete_missing(&store);
            }

            #[test]
            fn key_isolation() {
                let (store, _guard) = ($factory)($codec);
                $crate::test_key_isolation(&store);
            }

            #[test]
            fn types() {
                let (store, _guard) = ($factory)($codec);
                $crate::test_types(&store, $codec);
            }

            #[test]
            fn empty_keys() {
                let (store, _guard) = ($factory)($codec);
                $crate::test_empty_keys(&store);
            }

            #[test]
            fn nil_values() {
                let (store, _guard) = ($factory)($codec);
                $crate::test_nil_values(&store);
            }

            #[test]
            fn nil_destinations() {
                let (store, _guard) = ($factory)($codec);
                $crate::test_nil_destinations(&store);
            }

            #[test]
            fn encode_errors() {
                let (store, _guard) = ($factory)($codec);
                $crate::test_encode_errors(&store, $codec);
            }

            #[test]
            fn decode_errors() {
                let (store, _guard) = ($factory)($codec);
                $crate::test_decode_errors(&store);
            }

            #[test]
            fn concurrent_interactions() {
                let (store, _guard) = ($factory)($codec);
                $crate::test_concurrent_interactions(&store, $crate::DEFAULT_CALLER_COUNT);
            }

            #[test]
            fn close() {
                let (store, _guard) = ($factory)($codec);
                $crate::test_close(&store);
            }
        }
    };
    ($factory:expr) => {
        $crate::conformance_tests!(@codec json, $crate::Codec::Json, $factory);
        $crate::conformance_tests!(@codec bincode, $crate::Codec::Bincode, $factory);
    };
    ($factory:expr, max_key_len = $max:expr) => {
        $crate::conformance_tests!($factory);

        #[test]
        fn key_limit() {
            let (store, _guard) = ($factory)($crate::Codec::Json);
            $crate::test_key_limit(&store, $max);
        }
    };
}
