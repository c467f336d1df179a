//! Aggregated validation errors.
//!
//! The validator never stops at the first bad field. Every failure is
//! recorded as a [`ValidationError`] and the whole list comes back as one
//! [`ValidationReport`].

use std::fmt;

use serde::Serialize;
use serde_json::{json, Value as Json};

use crate::schema::Source;

/// Where a failed field lives: its schema, its request source and the path
/// from the top-level field down to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLocation {
    schema: String,
    source: Source,
    path: Vec<String>,
}

impl ErrorLocation {
    /// Location of a field reached through `path`.
    pub fn new(schema: impl Into<String>, source: Source, path: Vec<String>) -> Self {
        Self {
            schema: schema.into(),
            source,
            path,
        }
    }

    /// Schema that declares the failed field.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Request source of the top-level field.
    pub fn source(&self) -> Source {
        self.source
    }

    /// Field names from the top-level field down to the failed one.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Name of the failed field itself.
    pub fn field(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }

    /// `source` followed by the path segments, as rendered in `loc`.
    pub fn loc(&self) -> Vec<String> {
        std::iter::once(self.source.to_string())
            .chain(self.path.iter().cloned())
            .collect()
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.source, self.path.join("."))
    }
}

/// Failure category of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field had no value
    Missing,
    /// The raw value could not be coerced to the declared type
    TypeMismatch {
        /// Declared type, e.g. `integer`
        expected: &'static str,
    },
    /// A declared constraint did not hold
    ConstraintViolation {
        /// Constraint name, e.g. `max_length`
        constraint: &'static str,
    },
    /// A referenced entity does not exist
    NotFound,
}

impl ErrorKind {
    /// Machine-readable code used as `type` in the error body.
    pub fn code(&self) -> String {
        match self {
            ErrorKind::Missing => "value_error.missing".to_string(),
            ErrorKind::TypeMismatch { expected } => format!("type_error.{}", expected),
            ErrorKind::ConstraintViolation { constraint } => format!("value_error.{}", constraint),
            ErrorKind::NotFound => "value_error.not_found".to_string(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Missing => write!(f, "missing"),
            ErrorKind::TypeMismatch { .. } => write!(f, "type-mismatch"),
            ErrorKind::ConstraintViolation { .. } => write!(f, "constraint-violation"),
            ErrorKind::NotFound => write!(f, "not-found"),
        }
    }
}

/// One field that failed.
///
/// Messages describe the expectation, never the submitted value, so that
/// secrets cannot leak through error bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    location: ErrorLocation,
    kind: ErrorKind,
    message: String,
}

impl ValidationError {
    /// Creates an error at `location`.
    pub fn new(location: ErrorLocation, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            location,
            kind,
            message: message.into(),
        }
    }

    /// Where the failure happened.
    pub fn location(&self) -> &ErrorLocation {
        &self.location
    }

    /// What kind of failure it was.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.location, self.kind, self.message)
    }
}

#[derive(Serialize)]
struct Detail<'a> {
    loc: Vec<String>,
    msg: &'a str,
    #[serde(rename = "type")]
    kind: String,
}

/// Every failure found while validating one request, in field order.
///
/// An empty report means the request passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
    omitted: usize,
}

impl ValidationReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Keeps at most `max` errors, counting the rest as omitted.
    pub(crate) fn truncate(&mut self, max: usize) {
        if self.errors.len() > max {
            self.omitted += self.errors.len() - max;
            self.errors.truncate(max);
        }
    }

    /// Returns `true` if no field failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of errors kept in the report.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Errors dropped by the configured cap.
    pub fn omitted(&self) -> usize {
        self.omitted
    }

    /// Errors in field order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Iterates over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Finds the first error for a field, by dotted path (`location.city`).
    pub fn for_field(&self, path: &str) -> Option<&ValidationError> {
        self.errors
            .iter()
            .find(|e| e.location.path.join(".") == path)
    }

    /// Renders the 422 response body:
    /// `{"detail": [{"loc": [...], "msg": "...", "type": "..."}]}`.
    pub fn to_json(&self) -> Json {
        let detail: Vec<Detail<'_>> = self
            .errors
            .iter()
            .map(|e| Detail {
                loc: e.location.loc(),
                msg: &e.message,
                kind: e.kind.code(),
            })
            .collect();
        json!({ "detail": detail })
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid field(s)", self.errors.len() + self.omitted)?;
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}
