//! Web framework integration surface.
//!
//! This module provides the boundary between HTTP frameworks and the
//! binding engine. It handles:
//! - Pulling raw request data through [`SourceProvider`]
//! - Introducing taint at the boundary (untrusted inputs → `Tainted<T>`)
//! - Running bind, validate, handler and project for one request
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: This module contains no framework-specific code.
//!    It defines interfaces that framework-specific code can implement.
//!
//! 2. **Taint at Boundary**: All external inputs (path, query, form, headers,
//!    cookies, body) are wrapped in `Tainted<T>` at extraction time.
//!
//! 3. **Handlers See Only Valid Input**: [`dispatch`] calls the handler with a
//!    `Verified<Entity>` or not at all.
//!
//! 4. **Explicit Context**: No global state. Request IDs and collaborators
//!    flow through [`HandlerContext`](crate::HandlerContext).
//!
//! # Integration Model
//!
//! Framework-specific code should:
//! 1. Build a `RequestAdapter` from the framework request (or implement
//!    `SourceProvider` for it)
//! 2. Build a `HandlerContext` carrying the request ID and collaborators
//! 3. Call [`dispatch`] with the endpoint and handler
//! 4. Write the returned `Response` status and body
//!
//! # Example Flow
//!
//! ```ignore
//! // In a framework-specific integration (e.g., axum, actix):
//! let mut adapter = RequestAdapter::from_http_request(http_req);
//! let ctx = HandlerContext::new(adapter.request_id(), people.clone());
//!
//! let response = dispatch(&engine, &endpoint, ctx, &mut adapter, show_person);
//! reply(response.status, response.body);
//! ```

mod adapter;
pub mod example_handler;
mod extract;
mod middleware;

pub use adapter::RequestAdapter;
pub use extract::SourceProvider;
pub use middleware::{dispatch, Endpoint, Method, Response};
