use std::fmt;

use crate::report::ValidationReport;
use crate::schema::Source;
use crate::upload::UploadError;

/// Errors surfaced by the binding engine.
///
/// Each variant maps to one class of failure with its own handling:
///
/// | Variant      | When            | Status |
/// |--------------|-----------------|--------|
/// | `Schema`     | process start   | fatal  |
/// | `Binder`     | request         | 500    |
/// | `Validation` | request         | 422    |
/// | `NotFound`   | handler         | 404    |
/// | `Upload`     | handler         | 500    |
#[derive(Debug)]
pub enum Error {
    /// The schema graph is broken; the process must not serve traffic
    Schema(SchemaDefinitionError),
    /// The source provider could not be queried
    Binder(BinderError),
    /// One or more fields failed validation
    Validation(ValidationReport),
    /// A business rule found that a referenced entity does not exist
    NotFound(String),
    /// An uploaded file stream could not be read
    Upload(UploadError),
}

impl Error {
    /// Creates a not-found business error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }

    /// HTTP status code the host should answer with.
    pub fn status(&self) -> u16 {
        match self {
            Error::Validation(_) => 422,
            Error::NotFound(_) => 404,
            Error::Schema(_) | Error::Binder(_) | Error::Upload(_) => 500,
        }
    }

    /// Returns the validation report, if this is a validation failure.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Error::Validation(report) => Some(report),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema(e) => write!(f, "schema definition error: {}", e),
            Error::Binder(e) => write!(f, "binder error: {}", e),
            Error::Validation(r) => write!(f, "validation failed: {}", r),
            Error::NotFound(msg) => write!(f, "not found: {}", msg),
            Error::Upload(e) => write!(f, "upload error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Schema(e) => Some(e),
            Error::Binder(e) => Some(e),
            Error::Validation(r) => Some(r),
            Error::Upload(e) => Some(e),
            Error::NotFound(_) => None,
        }
    }
}

impl From<SchemaDefinitionError> for Error {
    fn from(e: SchemaDefinitionError) -> Self {
        Error::Schema(e)
    }
}

impl From<BinderError> for Error {
    fn from(e: BinderError) -> Self {
        Error::Binder(e)
    }
}

impl From<ValidationReport> for Error {
    fn from(r: ValidationReport) -> Self {
        Error::Validation(r)
    }
}

impl From<UploadError> for Error {
    fn from(e: UploadError) -> Self {
        Error::Upload(e)
    }
}

/// A schema graph that cannot be resolved.
///
/// Raised while building a [`SchemaRegistry`](crate::SchemaRegistry) or when
/// looking up a schema that was never defined. All variants are fatal at
/// startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDefinitionError {
    /// The `extends` chain loops back on itself
    Cycle {
        /// Schemas on the cycle, in traversal order
        chain: Vec<String>,
    },
    /// A schema extends a parent that was never defined
    UnknownParent {
        /// The child schema
        schema: String,
        /// The missing parent
        parent: String,
    },
    /// A field refers to a nested schema that was never defined
    UnknownNestedSchema {
        /// The schema holding the field
        schema: String,
        /// The field name
        field: String,
        /// The missing nested schema
        nested: String,
    },
    /// Two definitions share a name
    DuplicateSchema {
        /// The repeated schema name
        schema: String,
    },
    /// A definition lists the same field twice
    DuplicateField {
        /// The schema
        schema: String,
        /// The repeated field
        field: String,
    },
    /// A child overrides a parent field with a different type
    TypeConflict {
        /// The child schema
        schema: String,
        /// The overridden field
        field: String,
        /// Type declared by the parent
        parent_type: String,
        /// Type declared by the child
        child_type: String,
    },
    /// A required field declares a default value
    DefaultOnRequired {
        /// The schema
        schema: String,
        /// The field
        field: String,
    },
    /// A default value does not fit the field's declared type
    InvalidDefault {
        /// The schema
        schema: String,
        /// The field
        field: String,
        /// Why the default was rejected
        reason: String,
    },
    /// A schema hides a field its parent does not declare
    UnknownHiddenField {
        /// The schema
        schema: String,
        /// The hidden field
        field: String,
    },
    /// A constraint is declared on a field type it cannot check
    InapplicableConstraint {
        /// The schema
        schema: String,
        /// The field
        field: String,
        /// Name of the constraint
        constraint: &'static str,
    },
    /// A field's source does not fit its type
    InvalidSource {
        /// The schema
        schema: String,
        /// The field
        field: String,
        /// Why the source was rejected
        reason: String,
    },
    /// A lookup named a schema that is not registered
    UnknownSchema {
        /// The requested schema name
        schema: String,
    },
}

impl fmt::Display for SchemaDefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle { chain } => write!(f, "cyclic extends chain: {}", chain.join(" -> ")),
            Self::UnknownParent { schema, parent } => {
                write!(f, "schema '{}' extends unknown schema '{}'", schema, parent)
            }
            Self::UnknownNestedSchema {
                schema,
                field,
                nested,
            } => write!(
                f,
                "field '{}.{}' refers to unknown schema '{}'",
                schema, field, nested
            ),
            Self::DuplicateSchema { schema } => write!(f, "schema '{}' defined twice", schema),
            Self::DuplicateField { schema, field } => {
                write!(f, "field '{}' declared twice in schema '{}'", field, schema)
            }
            Self::TypeConflict {
                schema,
                field,
                parent_type,
                child_type,
            } => write!(
                f,
                "field '{}.{}' overrides type {} with incompatible type {}",
                schema, field, parent_type, child_type
            ),
            Self::DefaultOnRequired { schema, field } => write!(
                f,
                "required field '{}.{}' cannot declare a default",
                schema, field
            ),
            Self::InvalidDefault {
                schema,
                field,
                reason,
            } => write!(f, "invalid default for '{}.{}': {}", schema, field, reason),
            Self::UnknownHiddenField { schema, field } => write!(
                f,
                "schema '{}' hides field '{}' which its parent does not declare",
                schema, field
            ),
            Self::InapplicableConstraint {
                schema,
                field,
                constraint,
            } => write!(
                f,
                "constraint '{}' does not apply to the type of '{}.{}'",
                constraint, schema, field
            ),
            Self::InvalidSource {
                schema,
                field,
                reason,
            } => write!(f, "invalid source for '{}.{}': {}", schema, field, reason),
            Self::UnknownSchema { schema } => write!(f, "unknown schema '{}'", schema),
        }
    }
}

impl std::error::Error for SchemaDefinitionError {}

/// A source provider that cannot deliver request data.
///
/// This is a host integration bug rather than a client error, so it is
/// surfaced as a 500-class failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderError {
    kind: BinderErrorKind,
    source: Source,
    field: String,
}

impl BinderError {
    /// Creates a binder error for the given field and source.
    pub fn new(kind: BinderErrorKind, source: Source, field: impl Into<String>) -> Self {
        Self {
            kind,
            source,
            field: field.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> BinderErrorKind {
        self.kind
    }

    /// The source that failed.
    pub fn source_location(&self) -> Source {
        self.source
    }

    /// The field being bound when the source failed.
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl fmt::Display for BinderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} while binding {} field '{}'",
            self.kind, self.source, self.field
        )
    }
}

impl std::error::Error for BinderError {}

/// Kind of binder failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderErrorKind {
    /// The provider cannot be queried for this source at all
    SourceUnavailable,
    /// File parts for this field were already handed out
    FilesAlreadyTaken,
    /// The body is present but cannot be queried by member name
    MalformedBody,
}

impl fmt::Display for BinderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnavailable => write!(f, "source unavailable"),
            Self::FilesAlreadyTaken => write!(f, "file parts already taken"),
            Self::MalformedBody => write!(f, "malformed body document"),
        }
    }
}
