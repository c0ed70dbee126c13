use std::fmt;
use std::str::FromStr;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::finite::ensure_finite;

/// Value-serialization strategy bound to a store handle.
///
/// Selected once at construction. Mixing codecs over the lifetime of one
/// logical key is unsupported: whichever codec wrote a value is the only one
/// guaranteed to read it back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// Structured text (JSON).
    #[default]
    Json,
    /// Compact binary (bincode, fixed-width integers).
    Bincode,
}

impl Codec {
    /// Every built-in strategy, in declaration order.
    pub const ALL: [Codec; 2] = [Codec::Json, Codec::Bincode];

    /// Stable lowercase name, as used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Bincode => "bincode",
        }
    }

    /// Whether encoded bytes describe their own structure.
    ///
    /// Only self-describing codecs can decode into dynamically shaped
    /// destinations such as `serde_json::Value`.
    pub fn is_self_describing(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Encode `value` into bytes.
    pub fn marshal<T: Serialize + ?Sized>(self, value: &T) -> CodecResult<Vec<u8>> {
        let encoded = match self {
            Self::Json => ensure_finite(value)
                .map_err(|e| e.to_string())
                .and_then(|()| serde_json::to_vec(value).map_err(|e| e.to_string())),
            Self::Bincode => bincode_options().serialize(value).map_err(|e| e.to_string()),
        };
        encoded.map_err(|reason| CodecError::Marshal { codec: self, reason })
    }

    /// Decode `data` into a fresh value of type `T`.
    pub fn unmarshal<T: DeserializeOwned>(self, data: &[u8]) -> CodecResult<T> {
        let decoded = match self {
            Self::Json => serde_json::from_slice(data).map_err(|e| e.to_string()),
            Self::Bincode => bincode_options().deserialize(data).map_err(|e| e.to_string()),
        };
        decoded.map_err(|reason| CodecError::Unmarshal { codec: self, reason })
    }

    /// Decode `data` into `dest`.
    ///
    /// `dest` is only overwritten when decoding succeeds.
    pub fn unmarshal_into<T: DeserializeOwned>(self, data: &[u8], dest: &mut T) -> CodecResult<()> {
        *dest = self.unmarshal(data)?;
        Ok(())
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "bincode" | "binary" => Ok(Self::Bincode),
            _ => Err(CodecError::Unknown(s.to_string())),
        }
    }
}

/// Bincode configuration shared by encode and decode.
///
/// Trailing bytes are rejected so that decoding into a type smaller than the
/// stored one is an error rather than a truncated read.
fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}
