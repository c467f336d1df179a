use std::fmt;

use serde::{Serialize, Serializer};

/// Placeholder written wherever a secret would otherwise appear.
pub const REDACTED: &str = "[REDACTED]";

/// A credential value bound from a request (passwords, tokens).
///
/// Fields declared with [`FieldType::Secret`](crate::FieldType::Secret) are
/// materialized as `Secret<String>`. The value never shows up in `Debug`,
/// `Display` or serialized output; handlers read it through
/// [`expose_secret`](Self::expose_secret).
///
/// # Examples
///
/// ```
/// use binding_core::Secret;
///
/// let password = Secret::new("correct horse".to_string());
///
/// assert_eq!(format!("{:?}", password), "[REDACTED]");
/// assert_eq!(format!("{}", password), "[REDACTED]");
/// assert_eq!(password.expose_secret(), "correct horse");
/// ```
// Do NOT derive Clone, Copy or Default: a credential must not be duplicated
// by accident while an entity is passed around.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// Every read of a credential goes through this method.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl Secret<String> {
    /// Number of characters in the secret, for length constraints.
    pub(crate) fn char_len(&self) -> usize {
        self.inner.chars().count()
    }
}

// No Deref, AsRef or Borrow. expose_secret() is the only way in.

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> Serialize for Secret<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}
