use std::fmt;
use std::sync::Arc;

use crate::config::SizeUnit;
use crate::error::Error;
use crate::logging::RequestLog;
use crate::report::{ErrorKind, ErrorLocation, ValidationError};
use crate::repository::IdentifierRegistry;
use crate::schema::Source;

/// Per-request context handed to handlers alongside the validated entity.
///
/// It carries the request ID, the collaborators a handler may consult and
/// the engine settings handlers need. Nothing in it is shared mutably
/// between requests; the identifier registry does its own locking.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use binding_core::{HandlerContext, InMemoryRegistry};
///
/// let people = Arc::new(InMemoryRegistry::new([1, 2, 3]));
/// let ctx = HandlerContext::new("req-123", people);
///
/// assert!(ctx.require_exists("Person", 2).is_ok());
///
/// let err = ctx.require_exists("Person", 42).unwrap_err();
/// assert_eq!(err.status(), 404);
/// ```
#[derive(Clone)]
pub struct HandlerContext {
    request_id: String,
    identifiers: Arc<dyn IdentifierRegistry>,
    size_unit: SizeUnit,
}

impl HandlerContext {
    /// Creates a context for one request.
    pub fn new(request_id: impl Into<String>, identifiers: Arc<dyn IdentifierRegistry>) -> Self {
        Self {
            request_id: request_id.into(),
            identifiers,
            size_unit: SizeUnit::default(),
        }
    }

    /// Sets the unit uploaded file sizes are reported in.
    pub(crate) fn with_size_unit(mut self, unit: SizeUnit) -> Self {
        self.size_unit = unit;
        self
    }

    /// Returns the request ID for this context.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Unit for reporting uploaded file sizes.
    pub fn size_unit(&self) -> SizeUnit {
        self.size_unit
    }

    /// Returns a logger stamped with this request's ID.
    pub fn log(&self) -> RequestLog<'_> {
        RequestLog::new(&self.request_id)
    }

    /// The identifier registry behind existence checks.
    pub fn identifiers(&self) -> &dyn IdentifierRegistry {
        self.identifiers.as_ref()
    }

    /// Checks that `id` refers to an existing `entity`.
    ///
    /// Call this before any side effect; a missing entity must stop the
    /// handler.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` naming the entity and the identifier.
    pub fn require_exists(&self, entity: &str, id: i64) -> Result<(), Error> {
        if self.identifiers.contains(id) {
            return Ok(());
        }

        let error = ValidationError::new(
            ErrorLocation::new(entity, Source::Path, vec!["id".to_string()]),
            ErrorKind::NotFound,
            format!("{} with id {} does not exist", entity, id),
        );
        self.log().warn(format_args!("{}", error));
        Err(Error::not_found(error.message()))
    }
}

impl fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("request_id", &self.request_id)
            .field("size_unit", &self.size_unit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRegistry;

    fn ctx() -> HandlerContext {
        HandlerContext::new("req-1", Arc::new(InMemoryRegistry::new([1, 2, 3, 4, 5, 117])))
    }

    #[test]
    fn existing_id_passes() {
        assert!(ctx().require_exists("Person", 117).is_ok());
    }

    #[test]
    fn missing_id_is_not_found() {
        let err = ctx().require_exists("Person", 42).unwrap_err();

        assert_eq!(err.status(), 404);
        assert!(format!("{}", err).contains("42"));
        assert!(err.report().is_none());
    }

    #[test]
    fn log_carries_request_id() {
        let ctx = ctx();
        assert_eq!(ctx.log().request_id(), "req-1");
    }

    #[test]
    fn size_unit_defaults_to_kibibytes() {
        let ctx = ctx();
        assert_eq!(ctx.size_unit(), SizeUnit::Kibibytes);
        assert_eq!(ctx.with_size_unit(SizeUnit::Bytes).size_unit(), SizeUnit::Bytes);
    }

    #[test]
    fn debug_omits_collaborators() {
        let debug = format!("{:?}", ctx());
        assert!(debug.contains("req-1"));
    }

    #[test]
    fn registry_is_swappable() {
        struct Everything;
        impl IdentifierRegistry for Everything {
            fn contains(&self, _id: i64) -> bool {
                true
            }
        }

        let ctx = HandlerContext::new("req-2", Arc::new(Everything));
        assert!(ctx.require_exists("Person", 999).is_ok());
        assert!(ctx.identifiers().contains(-1));
    }
}
