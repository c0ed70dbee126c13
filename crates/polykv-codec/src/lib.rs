//! Value codecs for PolyKV.
//!
//! Every store handle is bound to exactly one [`Codec`] for its lifetime. The
//! codec turns a caller's value into the opaque bytes a backend persists, and
//! turns those bytes back into a value of the caller's chosen type.
//!
//! # Strategies
//!
//! - [`Codec::Json`] -- structured text. Field names are kept, output is
//!   human-inspectable, and only serde-visible fields survive. Maps must be
//!   keyed by strings (or integers, which JSON stringifies).
//! - [`Codec::Bincode`] -- compact binary. Handles any shape serde can
//!   describe without `deserialize_any`, including maps with composite keys.
//!   The destination's static type drives decoding; the bytes are not
//!   self-describing.
//!
//! # Guarantees
//!
//! 1. A value that cannot be represented fails with [`CodecError::Marshal`];
//!    nothing is silently dropped. JSON has no `NaN` or infinity, so those
//!    fail to encode rather than turning into `null`.
//! 2. Bytes that do not fit the destination type fail with
//!    [`CodecError::Unmarshal`]; the binary codec rejects trailing bytes so a
//!    shorter type never "partially" decodes a longer value.

pub mod codec;
pub mod error;
mod finite;

pub use codec::Codec;
pub use error::{CodecError, CodecResult};
