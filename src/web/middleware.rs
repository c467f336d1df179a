//! Endpoint declarations and the per-request dispatch pipeline.
//!
//! `dispatch` is the single invocation point between a host server and a
//! handler:
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework-specific code builds a SourceProvider (e.g. RequestAdapter)
//!   ↓
//! Binder pulls every declared field          → BinderError   → 500
//!   ↓
//! Validator checks every field               → Report        → 422
//!   ↓
//! Handler(HandlerContext, Verified<Entity>)  → NotFound      → 404
//!   ↓
//! Projector shapes the result through the output schema
//!   ↓
//! Response { status, body }
//! ```
//!
//! The handler only ever runs on a fully valid request.

use std::fmt;

use serde_json::{json, Value as Json};

use crate::context::HandlerContext;
use crate::engine::Engine;
use crate::error::Error;
use crate::projector::Projectable;
use crate::value::Entity;
use crate::verified::Verified;

use super::SourceProvider;

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
        }
    }
}

/// Declaration of one endpoint: route, input schema, output schema and the
/// status returned on success.
///
/// # Examples
///
/// ```
/// use binding_core::web::{Endpoint, Method};
///
/// let create = Endpoint::new("create_person", Method::Post, "/person/new", "PersonIn", "PersonOut")
///     .created();
///
/// assert_eq!(create.success_status(), 201);
/// assert_eq!(create.to_string(), "POST /person/new");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    name: String,
    method: Method,
    path: String,
    input: String,
    output: String,
    success_status: u16,
}

impl Endpoint {
    /// Declares an endpoint answering 200 on success.
    pub fn new(
        name: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            input: input.into(),
            output: output.into(),
            success_status: 200,
        }
    }

    /// Answers 201 on success, for creation endpoints.
    pub fn created(self) -> Self {
        self.with_status(201)
    }

    /// Sets the success status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.success_status = status;
        self
    }

    /// Handler name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Route template, e.g. `/person/detail/{person_id}`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Input schema name.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Output schema name.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Status returned on success.
    pub fn success_status(&self) -> u16 {
        self.success_status
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// What the host should send back.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// JSON body
    pub body: Json,
}

impl Response {
    /// Maps an error to its status and body.
    ///
    /// Validation reports list every failure; not-found carries its message.
    /// Server-side failures get a generic body so that internals do not
    /// leak to the client.
    pub fn from_error(error: &Error) -> Self {
        let body = match error {
            Error::Validation(report) => report.to_json(),
            Error::NotFound(message) => json!({ "detail": message }),
            Error::Schema(_) | Error::Binder(_) | Error::Upload(_) => {
                json!({ "detail": "Internal Server Error" })
            }
        };
        Self {
            status: error.status(),
            body,
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Runs one request through bind, validate, handler and project.
///
/// `ctx` is built by the host for this request; its size unit is taken from
/// the engine configuration. The handler is not called unless every field
/// validated.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use binding_core::web::{dispatch, Endpoint, Method, RequestAdapter};
/// use binding_core::{Engine, FieldDef, FieldType, HandlerContext, InMemoryRegistry, SchemaDef, SchemaRegistry, Source};
///
/// let registry = SchemaRegistry::builder()
///     .define(SchemaDef::new("Echo").field(FieldDef::new("msg", FieldType::String, Source::Query)))
///     .build()
///     .unwrap();
/// let engine = Engine::new(registry);
/// let echo = Endpoint::new("echo", Method::Get, "/echo", "Echo", "Echo");
///
/// let mut request = RequestAdapter::new("req-1");
/// request.add_query_param("msg", "hi");
/// let ctx = HandlerContext::new("req-1", Arc::new(InMemoryRegistry::default()));
///
/// let response = dispatch(&engine, &echo, ctx, &mut request, |_ctx, input| Ok(input));
/// assert_eq!(response.status, 200);
/// assert_eq!(response.body["msg"], "hi");
/// ```
pub fn dispatch<P, F, O>(
    engine: &Engine,
    endpoint: &Endpoint,
    ctx: HandlerContext,
    provider: &mut P,
    handler: F,
) -> Response
where
    P: SourceProvider + ?Sized,
    F: FnOnce(&HandlerContext, Verified<Entity>) -> Result<O, Error>,
    O: Projectable,
{
    let ctx = ctx.with_size_unit(engine.config().size_unit());

    let outcome = engine
        .bind_and_validate(endpoint.input(), provider)
        .and_then(|input| handler(&ctx, input))
        .and_then(|result| engine.project(endpoint.output(), &result));

    match outcome {
        Ok(body) => {
            ctx.log().info(format_args!(
                "{} handled by {} with status {}",
                endpoint,
                endpoint.name(),
                endpoint.success_status()
            ));
            Response {
                status: endpoint.success_status(),
                body,
            }
        }
        Err(error) => {
            let response = Response::from_error(&error);
            match &error {
                Error::Validation(report) => ctx.log().warn(format_args!(
                    "{} rejected: {} invalid field(s)",
                    endpoint,
                    report.len() + report.omitted()
                )),
                Error::NotFound(_) => ctx.log().warn(format_args!("{} failed: {}", endpoint, error)),
                _ => ctx.log().error(format_args!("{} failed: {}", endpoint, error)),
            }
            response
        }
    }
}
