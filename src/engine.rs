use std::sync::Arc;

use serde_json::Value as Json;

use crate::binder::{self, BoundValues};
use crate::config::EngineConfig;
use crate::error::Error;
use crate::projector::{self, Projectable};
use crate::report::ValidationReport;
use crate::schema::{Schema, SchemaRegistry};
use crate::validator;
use crate::value::Entity;
use crate::verified::Verified;
use crate::web::SourceProvider;

/// Binding, validation and projection over one schema registry.
///
/// An `Engine` is built once at startup and shared by every request. It is
/// `Send + Sync`; clone it or wrap it in an `Arc` to hand it to worker
/// threads.
///
/// # Examples
///
/// ```
/// use binding_core::{Engine, FieldDef, FieldType, RequestAdapter, SchemaDef, SchemaRegistry, Source};
///
/// let registry = SchemaRegistry::builder()
///     .define(SchemaDef::new("Search")
///         .field(FieldDef::new("q", FieldType::String, Source::Query))
///         .field(FieldDef::new("page", FieldType::Integer, Source::Query).default(1)))
///     .build()
///     .unwrap();
/// let engine = Engine::new(registry);
///
/// let mut request = RequestAdapter::new("req-1");
/// request.add_query_param("q", "bruce");
///
/// let search = engine.bind_and_validate("Search", &mut request).unwrap();
/// assert_eq!(search.as_ref().get_i64("page"), Some(1));
///
/// // Missing required fields come back as a 422 report
/// let mut empty = RequestAdapter::new("req-2");
/// let err = engine.bind_and_validate("Search", &mut empty).unwrap_err();
/// assert_eq!(err.status(), 422);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<SchemaRegistry>,
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with the default configuration.
    pub fn new(registry: SchemaRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// Creates an engine over a registry that is already shared.
    pub fn from_shared(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            config: EngineConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The schema registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Looks up a schema by name.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if no schema has that name.
    pub fn schema(&self, name: &str) -> Result<&Arc<Schema>, Error> {
        Ok(self.registry.schema(name)?)
    }

    /// Extracts the raw value of every field of `schema` from `provider`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` for an unknown schema and `Error::Binder` if
    /// the provider fails.
    pub fn bind<P>(&self, schema: &str, provider: &mut P) -> Result<BoundValues, Error>
    where
        P: SourceProvider + ?Sized,
    {
        let schema = self.schema(schema)?;
        Ok(binder::bind(schema, provider, &self.config)?)
    }

    /// Validates bound values, aggregating every failure.
    ///
    /// # Errors
    ///
    /// Returns the full `ValidationReport` if any field failed.
    pub fn validate(&self, bound: BoundValues) -> Result<Verified<Entity>, ValidationReport> {
        validator::validate(&self.registry, bound, &self.config)
    }

    /// Binds and validates in one step.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema`, `Error::Binder` or `Error::Validation`.
    pub fn bind_and_validate<P>(
        &self,
        schema: &str,
        provider: &mut P,
    ) -> Result<Verified<Entity>, Error>
    where
        P: SourceProvider + ?Sized,
    {
        let bound = self.bind(schema, provider)?;
        Ok(self.validate(bound)?)
    }

    /// Projects a handler result through the output schema `schema`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if `schema` or a nested schema is unknown.
    pub fn project<P>(&self, schema: &str, result: &P) -> Result<Json, Error>
    where
        P: Projectable + ?Sized,
    {
        let schema = self.schema(schema)?;
        Ok(projector::project(&self.registry, schema, result)?)
    }
}
