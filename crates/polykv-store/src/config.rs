//! Construction-time configuration.
//!
//! A [`StoreConfig`] picks a backend and carries that backend's options,
//! including the codec. It is the only thing that changes when an
//! application swaps backends. Configurations are plain serde types and can
//! be loaded from TOML:
//!
//! ```toml
//! [backend]
//! kind = "file"
//! directory = "/var/lib/app/kv"
//! codec = "bincode"
//! ```

use std::path::Path;

use polykv_codec::Codec;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{self, CacheOptions};
use crate::error::{StoreError, StoreResult};
use crate::file::{self, FileOptions};
use crate::handle::StoreHandle;
use crate::memory::{self, MemoryOptions};

/// Backend selection plus backend-specific options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    Memory(MemoryOptions),
    File(FileOptions),
    Cache(CacheOptions),
}

impl BackendConfig {
    /// The configured backend's name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::File(_) => "file",
            Self::Cache(_) => "cache",
        }
    }

    /// The configured codec.
    pub fn codec(&self) -> Codec {
        match self {
            Self::Memory(o) => o.codec,
            Self::File(o) => o.codec,
            Self::Cache(o) => o.codec,
        }
    }

    /// Replace the configured codec.
    pub fn set_codec(&mut self, codec: Codec) {
        match self {
            Self::Memory(o) => o.codec = codec,
            Self::File(o) => o.codec = codec,
            Self::Cache(o) => o.codec = codec,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Memory(MemoryOptions::default())
    }
}

/// Top-level store configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendConfig,
}

impl StoreConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Open the configured backend behind a runtime-selected handle.
    pub fn open(self) -> StoreResult<StoreHandle> {
        info!(
            backend = self.backend.kind(),
            codec = %self.backend.codec(),
            "opening store"
        );
        let handle = match self.backend {
            BackendConfig::Memory(options) => memory::open(options)?.boxed(),
            BackendConfig::File(options) => file::open(options)?.boxed(),
            BackendConfig::Cache(options) => cache::open(options)?.boxed(),
        };
        Ok(handle)
    }
}
