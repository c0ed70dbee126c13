//! Argument checks shared by every store operation.
//!
//! All checks are pure and run before any encoding or backend I/O:
//!
//! - Keys must be non-empty. Backends may declare a maximum key length,
//!   which is enforced through the same [`ValidationError`] channel.
//! - Values must not be nil. "Nil" is whatever serializes as an absent
//!   value: `None`, `()`, and any transparent wrapper around those
//!   (`Some(None)`, `Box<Option<T>>` holding `None`, newtype structs).
//! - Read destinations must be writable storage (see [`Dest`]).

use std::fmt;

use serde::ser::{self, Impossible, Serialize};

use crate::dest::Dest;
use crate::error::ValidationError;

/// Reject empty keys.
///
/// # Examples
///
/// ```
/// use polykv_store::validate::validate_key;
///
/// assert!(validate_key("foo").is_ok());
/// assert!(validate_key("").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey);
    }
    Ok(())
}

/// Reject empty keys and keys longer than `max_len` bytes.
pub fn validate_key_with_limit(
    key: &str,
    max_len: Option<usize>,
    backend: &'static str,
) -> Result<(), ValidationError> {
    validate_key(key)?;
    match max_len {
        Some(max) if key.len() > max => Err(ValidationError::KeyTooLong {
            len: key.len(),
            max,
            backend,
        }),
        _ => Ok(()),
    }
}

/// Reject nil values.
pub fn validate_value<T: Serialize + ?Sized>(value: &T) -> Result<(), ValidationError> {
    if is_nil(value) {
        return Err(ValidationError::NilValue);
    }
    Ok(())
}

/// Accept only writable storage, yielding it; each invalid form has its
/// own error.
pub fn validate_destination<'a, T>(dest: Dest<'a, T>) -> Result<&'a mut T, ValidationError> {
    match dest {
        Dest::Slot(slot) => Ok(slot),
        Dest::Missing => Err(ValidationError::MissingDestination),
        Dest::Untyped => Err(ValidationError::UntypedDestination),
        Dest::Null => Err(ValidationError::NullDestination),
    }
}

/// Whether `value` serializes as an absent value.
///
/// Only the outermost layer is inspected: `Some(x)` and newtype structs are
/// looked through, anything else with content is a value.
pub fn is_nil<T: Serialize + ?Sized>(value: &T) -> bool {
    value.serialize(NilProbe).is_ok()
}

/// Serializer that succeeds only for nil shapes.
///
/// Every non-nil shape returns [`Present`] immediately, so probing never
/// walks into a value's fields.
struct NilProbe;

#[derive(Debug)]
struct Present;

impl fmt::Display for Present {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("value is present")
    }
}

impl std::error::Error for Present {}

impl ser::Error for Present {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Present
    }
}

macro_rules! present {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, _: $ty) -> Result<(), Present> {
                Err(Present)
            }
        )*
    };
}

impl ser::Serializer for NilProbe {
    type Ok = ();
    type Error = Present;
    type SerializeSeq = Impossible<(), Present>;
    type SerializeTuple = Impossible<(), Present>;
    type SerializeTupleStruct = Impossible<(), Present>;
    type SerializeTupleVariant = Impossible<(), Present>;
    type SerializeMap = Impossible<(), Present>;
    type SerializeStruct = Impossible<(), Present>;
    type SerializeStructVariant = Impossible<(), Present>;

    present! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
        serialize_unit_struct(&'static str),
    }

    fn serialize_none(self) -> Result<(), Present> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), Present> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Present> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<(), Present> {
        Err(Present)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), Present> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<(), Present> {
        Err(Present)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Present> {
        Err(Present)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Present> {
        Err(Present)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Present> {
        Err(Present)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Present> {
        Err(Present)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Present> {
        Err(Present)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Present> {
        Err(Present)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Present> {
        Err(Present)
    }
}
