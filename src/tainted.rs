use std::fmt;

/// A raw value pulled out of a request that has not been validated yet.
///
/// Every value a [`SourceProvider`](crate::web::SourceProvider) hands to the
/// binder is wrapped in `Tainted<T>`. The only way to read it is through the
/// validator, which coerces and checks it before materializing an
/// [`Entity`](crate::Entity).
///
/// # Examples
///
/// ```
/// use binding_core::{RawValue, Tainted};
///
/// let age = Tainted::new(RawValue::text("42"));
///
/// // Debug output marks the value as untrusted
/// assert!(format!("{:?}", age).starts_with("Tainted"));
///
/// // But there is no way to get at the string from outside the crate:
/// // let s: &str = age.as_ref(); // Won't compile!
/// ```
// Clone stays: a provider may hand the same tainted value to several fields.
#[derive(Clone)]
pub struct Tainted<T> {
    // Must stay private. Reading it directly would skip coercion and
    // constraint checks entirely.
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an untrusted value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Borrows the raw value in unit tests.
    #[cfg(test)]
    pub(crate) fn peek(&self) -> &T {
        &self.inner
    }

    /// Extracts the raw value for coercion.
    ///
    /// Only the validator calls this; it is `pub(crate)` so that handlers
    /// cannot read request data that has not gone through validation.
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

// No Deref, AsRef, Borrow, From<T> or Into<T>: each of those would let raw
// request data reach a handler without validation.

impl<T: fmt::Debug> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tainted")
            .field("inner", &self.inner)
            .finish()
    }
}
