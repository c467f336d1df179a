//! Typed values materialized by the validator.

use serde_json::{Map, Value as Json};

use crate::secret::{Secret, REDACTED};
use crate::upload::FilePart;

/// A field value after coercion and constraint checks.
#[derive(Debug)]
pub enum Value {
    /// Optional field that was absent and has no default
    Null,
    /// Free-form text
    String(String),
    /// Signed integer
    Integer(i64),
    /// Boolean flag
    Boolean(bool),
    /// Member of an enumerated set
    Enum(String),
    /// Credential; never echoed back
    Secret(Secret<String>),
    /// Nested schema instance
    Object(Entity),
    /// A single uploaded file, not yet consumed
    File(FilePart),
    /// Several uploaded files, in request order
    Files(Vec<FilePart>),
}

impl Value {
    /// Short type name for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
            Value::Enum(_) => "enum",
            Value::Secret(_) => "secret",
            Value::Object(_) => "object",
            Value::File(_) => "file",
            Value::Files(_) => "file list",
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text content of string and enum values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean content.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Renders the value as JSON.
    ///
    /// Secrets become `"[REDACTED]"`; files render their metadata only,
    /// since reading the stream would consume it.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::String(s) | Value::Enum(s) => Json::String(s.clone()),
            Value::Integer(n) => Json::from(*n),
            Value::Boolean(b) => Json::Bool(*b),
            Value::Secret(_) => Json::String(REDACTED.to_string()),
            Value::Object(entity) => Json::Object(entity.to_json_map()),
            Value::File(part) => part.metadata_json(),
            Value::Files(parts) => Json::Array(parts.iter().map(FilePart::metadata_json).collect()),
        }
    }
}

/// A validated record: ordered field names and their typed values.
///
/// Only the validator builds entities, and the public API offers no way to
/// change one afterwards. Handlers receive it as
/// [`Verified<Entity>`](crate::Verified) and own it for the rest of the
/// request.
#[derive(Debug)]
pub struct Entity {
    schema: String,
    fields: Vec<(String, Value)>,
}

impl Entity {
    pub(crate) fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            fields: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push((name.into(), value));
    }

    /// Name of the schema this entity was validated against.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Looks up a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Text of a string or enum field.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Value of an integer field.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Value of a boolean field.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// A secret field.
    pub fn get_secret(&self, name: &str) -> Option<&Secret<String>> {
        match self.get(name) {
            Some(Value::Secret(s)) => Some(s),
            _ => None,
        }
    }

    /// A nested object field.
    pub fn get_object(&self, name: &str) -> Option<&Entity> {
        match self.get(name) {
            Some(Value::Object(e)) => Some(e),
            _ => None,
        }
    }

    /// Field names in schema order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Iterates over `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the entity has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consumes the entity and returns one field's value.
    ///
    /// This is how handlers take ownership of file parts before reading them.
    pub fn into_value(self, name: &str) -> Option<Value> {
        self.fields
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Renders every field as a JSON object, in schema order.
    pub fn to_json_map(&self) -> Map<String, Json> {
        self.fields
            .iter()
            .map(|(n, v)| (n.clone(), v.to_json()))
            .collect()
    }
}
