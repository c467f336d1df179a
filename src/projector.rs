//! Response projector: shapes a handler's result through an output schema.
//!
//! Only fields the output schema declares survive. Inherited fields the
//! schema hides (a password on `PersonOut`, say) never reach the response,
//! whatever the handler returned.

use serde_json::{Map, Value as Json};

use crate::error::SchemaDefinitionError;
use crate::schema::{FieldType, Schema, SchemaRegistry};
use crate::secret::REDACTED;
use crate::value::{Entity, Value};
use crate::verified::Verified;

/// Something a handler can return for projection.
///
/// Implemented for validated entities and for JSON objects, so handlers can
/// echo their input or build a fresh document.
pub trait Projectable {
    /// Returns the JSON form of the named field, if the result has one.
    fn field(&self, name: &str) -> Option<Json>;
}

impl Projectable for Entity {
    fn field(&self, name: &str) -> Option<Json> {
        self.get(name).map(Value::to_json)
    }
}

impl<T: Projectable> Projectable for Verified<T> {
    fn field(&self, name: &str) -> Option<Json> {
        self.as_ref().field(name)
    }
}

impl Projectable for Map<String, Json> {
    fn field(&self, name: &str) -> Option<Json> {
        self.get(name).cloned()
    }
}

impl Projectable for Json {
    fn field(&self, name: &str) -> Option<Json> {
        self.as_object().and_then(|map| map.get(name)).cloned()
    }
}

/// Projects `source` through `schema`, in the schema's field order.
///
/// Declared fields missing from `source` are omitted. Secret fields always
/// render as `"[REDACTED]"`. Nested object fields are projected through
/// their own schema.
///
/// # Errors
///
/// Returns `SchemaDefinitionError::UnknownSchema` if a nested schema is not
/// registered.
pub(crate) fn project<P>(
    registry: &SchemaRegistry,
    schema: &Schema,
    source: &P,
) -> Result<Json, SchemaDefinitionError>
where
    P: Projectable + ?Sized,
{
    let mut out = Map::with_capacity(schema.len());

    for field in schema.fields() {
        let Some(value) = source.field(field.name()) else {
            tracing::debug!(schema = %schema.name(), field = %field.name(), "declared field absent from result");
            continue;
        };

        let projected = match (field.field_type(), value) {
            (_, Json::Null) => Json::Null,
            (FieldType::Secret, _) => Json::String(REDACTED.to_string()),
            (FieldType::Object(nested), Json::Object(members)) => {
                let nested = registry.schema(nested)?;
                project(registry, nested, &members)?
            }
            (_, other) => other,
        };
        out.insert(field.name().to_string(), projected);
    }

    Ok(Json::Object(out))
}
