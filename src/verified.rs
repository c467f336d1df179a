/// A value produced by a successful validation pass.
///
/// The validator is the only code that constructs `Verified<T>`; there is no
/// public constructor and no `From<T>`. Handlers receive a
/// `Verified<Entity>` and can therefore rely on every declared constraint
/// having held for the request.
///
/// # Examples
///
/// External callers cannot create `Verified<T>` directly:
///
/// ```compile_fail
/// use binding_core::Verified;
///
/// let verified = Verified::new("data".to_string());
/// ```
///
/// Values come out of the engine instead:
///
/// ```
/// use binding_core::{Engine, FieldDef, FieldType, RequestAdapter, SchemaDef, SchemaRegistry, Source};
/// use binding_core::constraint::Constraint;
///
/// let registry = SchemaRegistry::builder()
///     .define(SchemaDef::new("Lookup").field(
///         FieldDef::new("age", FieldType::Integer, Source::Query).constraint(Constraint::Gt(0)),
///     ))
///     .build()
///     .unwrap();
/// let engine = Engine::new(registry);
///
/// let mut request = RequestAdapter::new("req-1");
/// request.add_query_param("age", "30");
///
/// let entity = engine.bind_and_validate("Lookup", &mut request).unwrap();
/// assert_eq!(entity.as_ref().get_i64("age"), Some(30));
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Verified<T> {
    inner: T,
}

impl<T> Verified<T> {
    /// Wraps a value that the caller has already validated.
    ///
    /// `pub(crate)` so that the validator stays the single construction path.
    pub(crate) fn new_unchecked(value: T) -> Self {
        Self { inner: value }
    }

    /// Consumes the wrapper and returns the validated value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> AsRef<T> for Verified<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}
