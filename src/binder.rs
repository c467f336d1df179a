//! Parameter binder: pulls each declared field's raw value out of the
//! request.
//!
//! The binder does not coerce or check anything. It produces one
//! [`BoundValue`] per effective field, in schema order, each holding either
//! the tainted raw input or nothing.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::config::EngineConfig;
use crate::error::BinderError;
use crate::schema::{FieldDef, FieldType, Schema, Source};
use crate::tainted::Tainted;
use crate::upload::FilePart;
use crate::web::SourceProvider;

/// Raw request data for one field, before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Text from the path, query string, form, a header or a cookie
    Text(String),
    /// A body member or the whole body document
    Json(Json),
}

impl RawValue {
    /// Builds a [`RawValue::Text`].
    pub fn text(value: impl Into<String>) -> Self {
        RawValue::Text(value.into())
    }

    /// Builds a [`RawValue::Json`].
    pub fn json(value: impl Into<Json>) -> Self {
        RawValue::Json(value.into())
    }

    /// Whether the client sent an explicit JSON `null`.
    pub(crate) fn is_null(&self) -> bool {
        matches!(self, RawValue::Json(Json::Null))
    }
}

/// Progress of one field through binding and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing was found in the request
    Unbound,
    /// A raw value was found
    Bound,
    /// The raw value was converted to the declared type
    Coerced,
    /// Every constraint held
    Validated,
    /// Coercion or a constraint failed
    Rejected,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Unbound => write!(f, "unbound"),
            Resolution::Bound => write!(f, "bound"),
            Resolution::Coerced => write!(f, "coerced"),
            Resolution::Validated => write!(f, "validated"),
            Resolution::Rejected => write!(f, "rejected"),
        }
    }
}

/// What the binder found for a field.
#[derive(Debug)]
pub(crate) enum RawInput {
    Absent,
    Value(Tainted<RawValue>),
    Files(Tainted<Vec<FilePart>>),
}

/// Raw input for one declared field.
#[derive(Debug)]
pub struct BoundValue {
    name: String,
    source: Source,
    input: RawInput,
    state: Resolution,
}

impl BoundValue {
    fn new(field: &FieldDef, input: RawInput) -> Self {
        let state = match input {
            RawInput::Absent => Resolution::Unbound,
            _ => Resolution::Bound,
        };
        Self {
            name: field.name().to_string(),
            source: field.source(),
            input,
            state,
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source the value was looked up in.
    pub fn source(&self) -> Source {
        self.source
    }

    /// Current resolution state.
    pub fn state(&self) -> Resolution {
        self.state
    }

    /// Whether the request carried a value for this field.
    pub fn is_present(&self) -> bool {
        !matches!(self.input, RawInput::Absent)
    }

    pub(crate) fn into_input(self) -> RawInput {
        self.input
    }
}

/// Bound values for every effective field of one schema, in schema order.
#[derive(Debug)]
pub struct BoundValues {
    schema: Arc<Schema>,
    values: Vec<BoundValue>,
}

impl BoundValues {
    /// The schema these values were bound against.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Looks up the bound value of a field.
    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        self.values.iter().find(|v| v.name == name)
    }

    /// Iterates in schema order.
    pub fn iter(&self) -> std::slice::Iter<'_, BoundValue> {
        self.values.iter()
    }

    /// Number of bound fields (present or not).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a schema without fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Arc<Schema>, Vec<BoundValue>) {
        (self.schema, self.values)
    }
}

/// Binds every effective field of `schema` from `provider`.
///
/// Absent fields are recorded as [`Resolution::Unbound`]; whether that is an
/// error is the validator's call.
///
/// # Errors
///
/// Returns `BinderError` if the provider fails for any field. Binding stops
/// there, since a broken provider cannot be trusted for the other fields.
pub(crate) fn bind<P>(
    schema: &Arc<Schema>,
    provider: &mut P,
    config: &EngineConfig,
) -> Result<BoundValues, BinderError>
where
    P: SourceProvider + ?Sized,
{
    let mut values = Vec::with_capacity(schema.len());

    for field in schema.fields() {
        let input = bind_field(field, provider, config)?;
        if matches!(input, RawInput::Absent) {
            tracing::trace!(schema = %schema.name(), field = %field.name(), source = %field.source(), "field not sent");
        }
        values.push(BoundValue::new(field, input));
    }

    Ok(BoundValues {
        schema: Arc::clone(schema),
        values,
    })
}

fn bind_field<P>(
    field: &FieldDef,
    provider: &mut P,
    config: &EngineConfig,
) -> Result<RawInput, BinderError>
where
    P: SourceProvider + ?Sized,
{
    if matches!(field.field_type(), FieldType::File | FieldType::FileList) {
        let parts = provider.take_files(field.name())?;
        return Ok(if parts.is_empty() {
            RawInput::Absent
        } else {
            RawInput::Files(Tainted::new(parts))
        });
    }

    let raw = if field.binds_whole_body() {
        provider.body()?
    } else {
        let name = lookup_name(field, config);
        provider.lookup(field.source(), &name)?
    };

    Ok(match raw {
        Some(raw) => RawInput::Value(raw),
        None => RawInput::Absent,
    })
}

/// Header fields named `user_agent` read the `user-agent` header.
fn lookup_name(field: &FieldDef, config: &EngineConfig) -> String {
    if field.source() == Source::Header && config.convert_underscores() {
        field.name().replace('_', "-")
    } else {
        field.name().to_string()
    }
}
