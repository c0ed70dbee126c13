//! Many callers sharing one store.
//!
//! Each caller gets an OS thread with a small stack and runs a short
//! script against the same store: its own key, a hot key every caller
//! writes, and a scratch key it creates and deletes. Failures inside a
//! caller panic that caller's thread, which the scope propagates.

use std::thread;

use polykv_store::Store;
use rand::Rng;
use tracing::debug;

use crate::fixtures::Stamp;

/// Callers the default storm runs.
pub const DEFAULT_CALLER_COUNT: usize = 1000;

/// Key every caller writes.
pub const SHARED_KEY: &str = "shared";

const CALLER_STACK_SIZE: usize = 256 * 1024;
const MAX_PAYLOAD: u32 = 512;

fn own_key(caller: usize) -> String {
    format!("caller-{caller}")
}

fn scratch_key(caller: usize) -> String {
    format!("scratch-{caller}")
}

/// Run `callers` concurrent callers against `store`, then verify what is
/// left: every caller's own value, no scratch keys, and a shared value
/// written whole by exactly one caller.
pub fn test_concurrent_interactions<S: Store>(store: &S, callers: usize) {
    thread::scope(|scope| {
        let handles: Vec<_> = (0..callers)
            .map(|caller| {
                thread::Builder::new()
                    .name(format!("caller-{caller}"))
                    .stack_size(CALLER_STACK_SIZE)
                    .spawn_scoped(scope, move || interact(store, caller))
                    .unwrap_or_else(|e| panic!("spawning caller {caller} failed: {e}"))
            })
            .collect();
        for (caller, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                panic!("caller {caller} failed");
            }
        }
    });
    debug!(callers, "concurrent callers finished");

    let mut out = Stamp::default();
    for caller in 0..callers {
        let key = own_key(caller);
        let found = store
            .get(&key, &mut out)
            .unwrap_or_else(|e| panic!("final get {key:?} failed: {e}"));
        assert!(found, "{key:?} must survive the storm");
        assert_eq!(out.owner, caller as u64, "{key:?} holds another caller's value");
        assert!(out.is_consistent(), "{key:?} holds a torn value");

        let scratch = scratch_key(caller);
        let found = store
            .get(&scratch, &mut out)
            .unwrap_or_else(|e| panic!("final get {scratch:?} failed: {e}"));
        assert!(!found, "{scratch:?} was deleted and must stay absent");
    }

    if callers > 0 {
        let found = store
            .get(SHARED_KEY, &mut out)
            .unwrap_or_else(|e| panic!("final get of the shared key failed: {e}"));
        assert!(found, "the shared key must hold the last write");
        assert!(out.is_consistent(), "the shared key holds a torn value");
        assert!((out.owner as usize) < callers);
    }
}

fn interact<S: Store>(store: &S, caller: usize) {
    let mut rng = rand::thread_rng();
    let key = own_key(caller);
    let mut out = Stamp::default();

    // Nobody else writes this key, so it starts absent.
    let found = store
        .get(&key, &mut out)
        .unwrap_or_else(|e| panic!("caller {caller}: first get failed: {e}"));
    assert!(!found, "caller {caller}: own key present before any write");

    let mine = Stamp::new(caller as u64, rng.gen_range(1..=MAX_PAYLOAD));
    store
        .set(&key, &mine)
        .unwrap_or_else(|e| panic!("caller {caller}: set failed: {e}"));
    let found = store
        .get(&key, &mut out)
        .unwrap_or_else(|e| panic!("caller {caller}: get after set failed: {e}"));
    assert!(found, "caller {caller}: own write not visible");
    assert_eq!(out, mine, "caller {caller}: own key changed under it");

    // The hot key always holds some caller's complete value.
    let shared = Stamp::new(caller as u64, rng.gen_range(1..=MAX_PAYLOAD));
    store
        .set(SHARED_KEY, &shared)
        .unwrap_or_else(|e| panic!("caller {caller}: shared set failed: {e}"));
    let found = store
        .get(SHARED_KEY, &mut out)
        .unwrap_or_else(|e| panic!("caller {caller}: shared get failed: {e}"));
    assert!(found, "caller {caller}: shared key vanished");
    assert!(out.is_consistent(), "caller {caller}: shared key read torn");

    let scratch = scratch_key(caller);
    store
        .set(&scratch, &mine)
        .unwrap_or_else(|e| panic!("caller {caller}: scratch set failed: {e}"));
    store
        .delete(&scratch)
        .unwrap_or_else(|e| panic!("caller {caller}: scratch delete failed: {e}"));
    let found = store
        .get(&scratch, &mut out)
        .unwrap_or_else(|e| panic!("caller {caller}: scratch get failed: {e}"));
    assert!(!found, "caller {caller}: deleted scratch key still readable");
}
