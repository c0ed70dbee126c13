//! Read destinations.
//!
//! A read decodes into storage the caller already owns. [`Dest`] names that
//! storage explicitly, along with the three ways a caller can fail to supply
//! it. Each invalid form is rejected with its own [`ValidationError`] before
//! the backend is consulted.

use crate::error::ValidationError;
use crate::validate::validate_destination;

/// Where a read should put the decoded value.
#[derive(Debug)]
pub enum Dest<'a, T> {
    /// Writable storage. The only variant a read accepts.
    Slot(&'a mut T),
    /// No destination at all.
    Missing,
    /// A type-erased handle with nothing behind it.
    Untyped,
    /// A typed handle that points at no storage.
    Null,
}

impl<'a, T> Dest<'a, T> {
    /// The writable storage, or the validation error for this form.
    ///
    /// Same as [`validate_destination`].
    pub fn into_slot(self) -> Result<&'a mut T, ValidationError> {
        validate_destination(self)
    }
}

impl<'a, T> From<&'a mut T> for Dest<'a, T> {
    fn from(slot: &'a mut T) -> Self {
        Self::Slot(slot)
    }
}

impl<'a, T> From<Option<&'a mut T>> for Dest<'a, T> {
    fn from(slot: Option<&'a mut T>) -> Self {
        match slot {
            Some(slot) => Self::Slot(slot),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_yields_storage() {
        let mut n = 1u32;
        let slot = Dest::from(&mut n).into_slot().unwrap();
        *slot = 2;
        assert_eq!(n, 2);
    }

    #[test]
    fn absent_option_is_null() {
        let dest = Dest::<u32>::from(None);
        assert_eq!(dest.into_slot().unwrap_err(), ValidationError::NullDestination);
    }

    #[test]
    fn each_invalid_form_has_its_own_error() {
        assert_eq!(
            Dest::<u32>::Missing.into_slot().unwrap_err(),
            ValidationError::MissingDestination
        );
        assert_eq!(
            Dest::<u32>::Untyped.into_slot().unwrap_err(),
            ValidationError::UntypedDestination
        );
        assert_eq!(
            Dest::<u32>::Null.into_slot().unwrap_err(),
            ValidationError::NullDestination
        );
    }
}
