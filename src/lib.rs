//! Declarative request binding, validation and response projection for HTTP
//! endpoints.
//!
//! Endpoints declare typed fields and where each one comes from (path,
//! query string, body, form, header, cookie or file upload). The engine
//! extracts the raw values, coerces and checks them against per-field
//! constraints, and hands the handler a validated entity. Whatever the
//! handler returns is projected through an output schema before it is
//! serialized.
//!
//! - **Schemas**: Named field sets with single inheritance and hidden
//!   fields, resolved once at startup
//! - **Taint tracking**: Raw request data is `Tainted<T>` until the validator
//!   has checked it
//! - **Error aggregation**: Every bad field is reported, never just the first
//!
//! # Core Types
//!
//! - [`SchemaRegistry`]: Immutable, resolved schema set
//! - [`Engine`]: Bind, validate and project over a registry
//! - [`Verified<T>`]: Proof that a value passed validation
//! - [`ValidationReport`]: Every failure of one request
//! - [`Secret<T>`]: Wrapper that redacts credentials in logs and output
//! - [`FilePart`]: Uploaded file stream, readable exactly once
//!
//! # Examples
//!
//! ```
//! use binding_core::constraint::Constraint;
//! use binding_core::{Engine, FieldDef, FieldType, RequestAdapter, SchemaDef, SchemaRegistry, Source};
//! use serde_json::json;
//!
//! let registry = SchemaRegistry::builder()
//!     .define(SchemaDef::new("Person")
//!         .field(FieldDef::new("name", FieldType::String, Source::Body)
//!             .constraint(Constraint::MaxLength(50)))
//!         .field(FieldDef::new("age", FieldType::Integer, Source::Body)
//!             .constraint(Constraint::Gt(0)))
//!         .field(FieldDef::new("password", FieldType::Secret, Source::Body)))
//!     .define(SchemaDef::new("PersonOut").extends("Person").hide("password"))
//!     .build()
//!     .expect("schemas resolve");
//! let engine = Engine::new(registry);
//!
//! let mut request = RequestAdapter::new("req-123");
//! request.set_body(json!({ "name": "Bruce", "age": 30, "password": "hunter22" }));
//!
//! let person = engine.bind_and_validate("Person", &mut request).unwrap();
//! let body = engine.project("PersonOut", &person).unwrap();
//! assert_eq!(body, json!({ "name": "Bruce", "age": 30 }));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod binder;
mod config;
pub mod constraint;
mod context;
mod engine;
mod error;
mod logging;
mod projector;
mod report;
mod repository;
mod schema;
mod secret;
mod tainted;
mod upload;
mod validator;
mod value;
mod verified;
pub mod web;

#[cfg(test)]
mod test_utils;

pub use binder::{BoundValue, BoundValues, RawValue, Resolution};
pub use config::{EngineConfig, SizeUnit};
pub use context::HandlerContext;
pub use engine::Engine;
pub use error::{BinderError, BinderErrorKind, Error, SchemaDefinitionError};
pub use logging::RequestLog;
pub use projector::Projectable;
pub use report::{ErrorKind, ErrorLocation, ValidationError, ValidationReport};
pub use repository::{IdentifierRegistry, InMemoryRegistry};
pub use schema::{
    Annotations, FieldDef, FieldType, Schema, SchemaDef, SchemaRegistry, SchemaRegistryBuilder,
    Source,
};
pub use secret::Secret;
pub use tainted::Tainted;
pub use upload::{measure_all, FilePart, UploadError, UploadedFile};
pub use value::{Entity, Value};
pub use verified::Verified;
pub use web::RequestAdapter;
