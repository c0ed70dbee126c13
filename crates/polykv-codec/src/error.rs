use crate::codec::Codec;

/// Errors from encoding or decoding a value.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The value contains a shape the codec cannot represent.
    #[error("{codec} cannot encode value: {reason}")]
    Marshal { codec: Codec, reason: String },

    /// The stored bytes do not fit the requested destination type.
    #[error("{codec} cannot decode value: {reason}")]
    Unmarshal { codec: Codec, reason: String },

    /// A codec name that matches no known strategy.
    #[error("unknown codec {0:?}, expected \"json\" or \"bincode\"")]
    Unknown(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
