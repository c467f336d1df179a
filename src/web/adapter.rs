//! Request adapter for mapping HTTP requests to binder inputs.

use std::collections::{HashMap, HashSet};

use serde_json::Value as Json;

use crate::binder::RawValue;
use crate::error::{BinderError, BinderErrorKind};
use crate::schema::Source;
use crate::tainted::Tainted;
use crate::upload::FilePart;

use super::SourceProvider;

#[derive(Debug)]
enum Body {
    Absent,
    Document(Json),
    Malformed,
}

/// Adapter for converting framework-specific HTTP requests into binder input.
///
/// `RequestAdapter` is the in-crate [`SourceProvider`]. It holds simple,
/// owned copies of every request part so that it does not couple to any
/// framework's request type. Framework-specific code should implement
/// `From<FrameworkRequest>` for `RequestAdapter`, or implement
/// `SourceProvider` directly.
///
/// # Examples
///
/// ```
/// use binding_core::web::{RequestAdapter, SourceProvider};
/// use binding_core::Source;
///
/// let mut adapter = RequestAdapter::new("req-12345");
/// adapter.add_query_param("q", "user input");
/// adapter.add_header("User-Agent", "curl/8.0");
///
/// assert!(adapter.lookup(Source::Query, "q").unwrap().is_some());
/// assert!(adapter.lookup(Source::Header, "user-agent").unwrap().is_some());
/// ```
#[derive(Debug)]
pub struct RequestAdapter {
    /// Unique request identifier (required)
    request_id: String,
    path_params: HashMap<String, String>,
    query_params: HashMap<String, String>,
    form_fields: HashMap<String, String>,
    /// Keyed by lowercased name
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    body: Body,
    files: HashMap<String, Vec<FilePart>>,
    taken: HashSet<String>,
}

impl RequestAdapter {
    /// Creates a new request adapter with the given request ID.
    ///
    /// All other parts start empty. Use the `add_*`/`set_*` methods to
    /// populate them.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            path_params: HashMap::new(),
            query_params: HashMap::new(),
            form_fields: HashMap::new(),
            headers: HashMap::new(),
            cookies: HashMap::new(),
            body: Body::Absent,
            files: HashMap::new(),
            taken: HashSet::new(),
        }
    }

    /// Adds a captured path segment.
    pub fn add_path_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.path_params.insert(key.into(), value.into());
    }

    /// Adds a query parameter. A repeated key keeps the last value.
    pub fn add_query_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query_params.insert(key.into(), value.into());
    }

    /// Adds a form field.
    pub fn add_form_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.form_fields.insert(key.into(), value.into());
    }

    /// Adds a header. Header names are matched case-insensitively.
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into().to_ascii_lowercase(), value.into());
    }

    /// Adds a cookie.
    pub fn add_cookie(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(key.into(), value.into());
    }

    /// Sets an already-parsed JSON body document.
    pub fn set_body(&mut self, body: Json) {
        self.body = Body::Document(body);
    }

    /// Parses and sets a raw JSON body.
    ///
    /// Bytes that are not valid JSON leave the body in a malformed state;
    /// body lookups then fail with `BinderErrorKind::MalformedBody`.
    pub fn set_body_bytes(&mut self, bytes: &[u8]) {
        self.body = match serde_json::from_slice(bytes) {
            Ok(doc) => Body::Document(doc),
            Err(err) => {
                tracing::debug!(request_id = %self.request_id, error = %err, "request body is not JSON");
                Body::Malformed
            }
        };
    }

    /// Adds an uploaded file part under the multipart field `name`.
    pub fn add_file(&mut self, name: impl Into<String>, part: FilePart) {
        self.files.entry(name.into()).or_default().push(part);
    }

    /// Returns a reference to the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    fn text(map: &HashMap<String, String>, name: &str) -> Option<Tainted<RawValue>> {
        map.get(name).map(|v| Tainted::new(RawValue::text(v.as_str())))
    }
}

impl SourceProvider for RequestAdapter {
    fn lookup(&self, source: Source, name: &str) -> Result<Option<Tainted<RawValue>>, BinderError> {
        let found = match source {
            Source::Path => Self::text(&self.path_params, name),
            Source::Query => Self::text(&self.query_params, name),
            Source::Form => Self::text(&self.form_fields, name),
            Source::Cookie => Self::text(&self.cookies, name),
            Source::Header => Self::text(&self.headers, &name.to_ascii_lowercase()),
            Source::Body => match &self.body {
                Body::Absent => None,
                Body::Document(doc) => doc
                    .get(name)
                    .map(|member| Tainted::new(RawValue::Json(member.clone()))),
                Body::Malformed => {
                    return Err(BinderError::new(BinderErrorKind::MalformedBody, source, name))
                }
            },
            Source::File => {
                return Err(BinderError::new(
                    BinderErrorKind::SourceUnavailable,
                    source,
                    name,
                ))
            }
        };
        Ok(found)
    }

    fn body(&self) -> Result<Option<Tainted<RawValue>>, BinderError> {
        match &self.body {
            Body::Absent => Ok(None),
            Body::Document(doc) => Ok(Some(Tainted::new(RawValue::Json(doc.clone())))),
            Body::Malformed => Err(BinderError::new(
                BinderErrorKind::MalformedBody,
                Source::Body,
                "",
            )),
        }
    }

    fn take_files(&mut self, name: &str) -> Result<Vec<FilePart>, BinderError> {
        if !self.taken.insert(name.to_string()) {
            return Err(BinderError::new(
                BinderErrorKind::FilesAlreadyTaken,
                Source::File,
                name,
            ));
        }
        Ok(self.files.remove(name).unwrap_or_default())
    }
}
