//! Stores opened through configuration, with the backend chosen at runtime.

use polykv_conformance::{conformance_tests, Codec};
use polykv_store::{BackendConfig, FileOptions, StoreConfig, StoreHandle};
use tempfile::TempDir;

fn open_store(codec: Codec) -> (StoreHandle, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let text = format!(
        "[backend]\nkind = \"file\"\ndirectory = {:?}\ncodec = \"{codec}\"\n",
        dir.path().join("kv").display().to_string()
    );
    let config = StoreConfig::from_toml_str(&text).unwrap();
    assert!(matches!(config.backend, BackendConfig::File(FileOptions { .. })));
    (config.open().unwrap(), dir)
}

conformance_tests!(open_store, max_key_len = 126);

mod switched {
    use super::*;
    use polykv_conformance::run_all;
    use polykv_store::{CacheOptions, MemoryOptions};

    #[test]
    fn same_calls_on_every_backend() {
        let dir = tempfile::tempdir().unwrap();
        for codec in Codec::ALL {
            let backends = [
                BackendConfig::Memory(MemoryOptions::default()),
                BackendConfig::File(FileOptions {
                    directory: dir.path().join(codec.name()),
                    ..FileOptions::default()
                }),
                BackendConfig::Cache(CacheOptions::default()),
            ];
            for mut backend in backends {
                backend.set_codec(codec);
                let store = StoreConfig { backend }.open().unwrap();
                run_all(&store, codec);
            }
        }
    }
}
