use polykv_codec::CodecError;

/// A caller-side mistake caught before the backend is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Keys must contain at least one character.
    #[error("key must not be empty")]
    EmptyKey,

    /// The backend caps key length and this key exceeds it.
    #[error("key is {len} bytes but the {backend} backend allows at most {max}")]
    KeyTooLong {
        len: usize,
        max: usize,
        backend: &'static str,
    },

    /// The value to store is nil (`None`, unit, or a wrapper around either).
    #[error("value must not be nil")]
    NilValue,

    /// No destination was supplied to a read.
    #[error("destination must not be nil")]
    MissingDestination,

    /// The destination is an untyped handle with nothing behind it.
    #[error("destination is an untyped nil handle")]
    UntypedDestination,

    /// The destination is a typed handle that points at no storage.
    #[error("destination is a typed handle pointing at nothing")]
    NullDestination,
}

/// Failure reported by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The handle was closed; no further operations are accepted.
    #[error("{backend} store is closed")]
    Closed { backend: &'static str },

    /// I/O error from the underlying storage medium.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes failed an integrity check.
    #[error("corrupt entry for key {key:?}: {reason}")]
    Corrupt { key: String, reason: String },

    /// The encoded value is larger than the backend accepts.
    #[error("value is {size} bytes but the {backend} backend allows at most {max}")]
    ValueTooLarge {
        size: usize,
        max: usize,
        backend: &'static str,
    },

    /// A lock guarding backend state was poisoned by a panicking holder.
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

/// Errors from store operations.
///
/// A missing key is not an error: reads report absence through their
/// `found` result instead.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The call itself was invalid (empty key, nil value, bad destination).
    #[error("invalid argument: {0}")]
    Validation(#[from] ValidationError),

    /// The codec could not represent the value.
    #[error("encode failed: {0}")]
    Encode(#[source] CodecError),

    /// The stored bytes could not be decoded into the destination.
    #[error("decode failed: {0}")]
    Decode(#[source] CodecError),

    /// The backend failed to carry out the operation.
    #[error("backend failure: {0}")]
    Backend(#[from] BackendError),

    /// Configuration could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_encode(&self) -> bool {
        matches!(self, Self::Encode(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }

    /// The validation failure, if this is one.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Backend(BackendError::Io(err))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use polykv_codec::Codec;

    #[test]
    fn classification() {
        let validation = StoreError::from(ValidationError::EmptyKey);
        assert!(validation.is_validation());
        assert_eq!(validation.validation(), Some(&ValidationError::EmptyKey));

        let encode = StoreError::Encode(CodecError::Marshal {
            codec: Codec::Json,
            reason: "key must be a string".into(),
        });
        assert!(encode.is_encode());
        assert!(!encode.is_decode());
        assert!(encode.validation().is_none());

        let backend = StoreError::from(std::io::Error::other("disk gone"));
        assert!(backend.is_backend());
    }

    #[test]
    fn messages() {
        let err = StoreError::from(ValidationError::KeyTooLong {
            len: 300,
            max: 250,
            backend: "cache",
        });
        assert_eq!(
            err.to_string(),
            "invalid argument: key is 300 bytes but the cache backend allows at most 250"
        );

        let closed = StoreError::from(BackendError::Closed { backend: "memory" });
        assert_eq!(closed.to_string(), "backend failure: memory store is closed");
    }
}
