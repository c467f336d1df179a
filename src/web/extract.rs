//! Extraction boundary trait for web integration.
//!
//! This module defines the abstraction the binder pulls raw request data
//! through, independent of any HTTP framework.

use crate::binder::RawValue;
use crate::error::BinderError;
use crate::schema::Source;
use crate::tainted::Tainted;
use crate::upload::FilePart;

/// Delivers raw request data to the binder.
///
/// Framework integrations implement this trait for their request type, or
/// copy the request into a [`RequestAdapter`](super::RequestAdapter).
/// Every value handed out MUST be wrapped in `Tainted<T>`; the binder never
/// sees plain request data.
///
/// # Design Notes
///
/// This trait does NOT:
/// - Coerce values (that's the validator's job)
/// - Decide whether a field is required (that's the schema's job)
///
/// It ONLY answers "what did the client send under this name?". Returning
/// `Ok(None)` means the client sent nothing; returning `Err` means the
/// provider itself is broken.
///
/// # Examples
///
/// ```
/// use binding_core::web::SourceProvider;
/// use binding_core::{BinderError, FilePart, RawValue, Source, Tainted};
/// use std::collections::HashMap;
///
/// // A provider that only knows query strings
/// struct QueryOnly {
///     query: HashMap<String, String>,
/// }
///
/// impl SourceProvider for QueryOnly {
///     fn lookup(&self, source: Source, name: &str) -> Result<Option<Tainted<RawValue>>, BinderError> {
///         match source {
///             Source::Query => Ok(self.query.get(name).map(|v| Tainted::new(RawValue::text(v.as_str())))),
///             _ => Ok(None),
///         }
///     }
///
///     fn body(&self) -> Result<Option<Tainted<RawValue>>, BinderError> {
///         Ok(None)
///     }
///
///     fn take_files(&mut self, _name: &str) -> Result<Vec<FilePart>, BinderError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait SourceProvider {
    /// Looks up the raw value sent under `name` in `source`.
    ///
    /// For [`Source::Body`] the name selects a member of the body document.
    /// Header lookups must be case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns `BinderError` if the source cannot be queried.
    fn lookup(&self, source: Source, name: &str) -> Result<Option<Tainted<RawValue>>, BinderError>;

    /// Returns the entire body document, if one was sent.
    ///
    /// # Errors
    ///
    /// Returns `BinderError` if the body cannot be read.
    fn body(&self) -> Result<Option<Tainted<RawValue>>, BinderError>;

    /// Hands over every file part uploaded under `name`, in request order.
    ///
    /// File streams can be read only once, so ownership moves to the caller.
    /// An empty vector means no parts were sent.
    ///
    /// # Errors
    ///
    /// Returns `BinderError` if the parts cannot be delivered, for example
    /// because they were already taken.
    fn take_files(&mut self, name: &str) -> Result<Vec<FilePart>, BinderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BinderErrorKind;

    // Provider that fails for every source
    struct Broken;

    impl SourceProvider for Broken {
        fn lookup(&self, source: Source, name: &str) -> Result<Option<Tainted<RawValue>>, BinderError> {
            Err(BinderError::new(BinderErrorKind::SourceUnavailable, source, name))
        }

        fn body(&self) -> Result<Option<Tainted<RawValue>>, BinderError> {
            Err(BinderError::new(BinderErrorKind::SourceUnavailable, Source::Body, ""))
        }

        fn take_files(&mut self, name: &str) -> Result<Vec<FilePart>, BinderError> {
            Err(BinderError::new(BinderErrorKind::SourceUnavailable, Source::File, name))
        }
    }

    #[test]
    fn trait_is_object_safe() {
        let mut provider: Box<dyn SourceProvider> = Box::new(Broken);

        let err = provider.lookup(Source::Cookie, "session").unwrap_err();
        assert_eq!(err.kind(), BinderErrorKind::SourceUnavailable);
        assert_eq!(err.source_location(), Source::Cookie);
        assert!(provider.take_files("image").is_err());
        assert!(provider.body().is_err());
    }
}
