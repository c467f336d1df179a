//! Validator: coercion, constraint checks and error aggregation.
//!
//! Every field is visited in schema order, whatever happened to the fields
//! before it. A field that fails coercion or a constraint contributes one
//! error and is left out of the entity; the others carry on. The entity is
//! only handed out when the report comes back empty.

use serde_json::{Map, Value as Json};

use crate::binder::{BoundValues, RawInput, RawValue, Resolution};
use crate::config::EngineConfig;
use crate::constraint::check_enum;
use crate::report::{ErrorKind, ErrorLocation, ValidationError, ValidationReport};
use crate::schema::{FieldDef, FieldType, Schema, SchemaRegistry, Source};
use crate::secret::Secret;
use crate::upload::FilePart;
use crate::value::{Entity, Value};
use crate::verified::Verified;

/// Validates bound values against their schema.
///
/// Nested object fields are validated against their own schema, looked up
/// in `registry`; their errors carry the full path (`location.city`).
///
/// # Errors
///
/// Returns the complete `ValidationReport` if any field failed, truncated
/// to `config.max_errors()` when set.
pub(crate) fn validate(
    registry: &SchemaRegistry,
    bound: BoundValues,
    config: &EngineConfig,
) -> Result<Verified<Entity>, ValidationReport> {
    let (schema, values) = bound.into_parts();
    let mut pass = Pass {
        registry,
        report: ValidationReport::new(),
    };
    let mut entity = Entity::new(schema.name());

    for (field, bound) in schema.fields().iter().zip(values) {
        let input = match bound.into_input() {
            RawInput::Absent => Input::Absent,
            RawInput::Value(raw) => Input::Raw(raw.into_inner()),
            RawInput::Files(parts) => Input::Files(parts.into_inner()),
        };
        let path = vec![field.name().to_string()];
        if let Some(value) = pass.field(&schema, field, input, field.source(), &path) {
            entity.insert(field.name(), value);
        }
    }

    let Pass { mut report, .. } = pass;
    tracing::debug!(
        schema = %schema.name(),
        fields = schema.len(),
        errors = report.len(),
        "validation pass finished"
    );

    if report.is_empty() {
        return Ok(Verified::new_unchecked(entity));
    }
    if let Some(max) = config.max_errors() {
        report.truncate(max);
    }
    Err(report)
}

/// Converts a declared default to a typed value.
///
/// Used by the registry to reject bad defaults up front, and by the
/// validator to fill in absent optional fields.
pub(crate) fn coerce_default(ty: &FieldType, default: &Json) -> Result<Value, String> {
    match ty {
        FieldType::Object(_) | FieldType::File | FieldType::FileList => {
            return Err(format!("{} fields cannot declare a default", ty));
        }
        _ => {}
    }
    if default.is_null() {
        return Ok(Value::Null);
    }

    let value = coerce_scalar(ty, RawValue::Json(default.clone()))
        .map_err(|m| m.message.to_string())?;
    if let FieldType::Enum(members) = ty {
        check_enum(members, &value).map_err(|v| v.into_message())?;
    }
    Ok(value)
}

enum Input {
    Absent,
    Raw(RawValue),
    Files(Vec<FilePart>),
}

struct Mismatch {
    expected: &'static str,
    message: &'static str,
}

fn mismatch(ty: &FieldType) -> Mismatch {
    let (expected, message) = match ty {
        FieldType::String | FieldType::Secret => ("str", "str type expected"),
        FieldType::Integer => ("integer", "value is not a valid integer"),
        FieldType::Boolean => ("bool", "value could not be parsed to a boolean"),
        FieldType::Enum(_) => ("enum", "str type expected"),
        FieldType::Object(_) => ("dict", "value is not a valid dict"),
        FieldType::File => ("file", "expected a single uploaded file"),
        FieldType::FileList => ("list", "expected a list of uploaded files"),
    };
    Mismatch { expected, message }
}

struct Pass<'r> {
    registry: &'r SchemaRegistry,
    report: ValidationReport,
}

impl Pass<'_> {
    fn reject(
        &mut self,
        schema: &Schema,
        source: Source,
        path: &[String],
        kind: ErrorKind,
        message: impl Into<String>,
    ) {
        tracing::debug!(
            schema = %schema.name(),
            field = %path.join("."),
            kind = %kind,
            state = %Resolution::Rejected,
            "field rejected"
        );
        self.report.push(ValidationError::new(
            ErrorLocation::new(schema.name(), source, path.to_vec()),
            kind,
            message,
        ));
    }

    fn field(
        &mut self,
        schema: &Schema,
        field: &FieldDef,
        input: Input,
        source: Source,
        path: &[String],
    ) -> Option<Value> {
        let ty = field.field_type();

        let coerced = match input {
            Input::Raw(raw) if !raw.is_null() => match (ty, raw) {
                (FieldType::Object(nested), RawValue::Json(Json::Object(members))) => {
                    return self.object(nested, members, source, path);
                }
                (ty, raw) => coerce_scalar(ty, raw),
            },
            Input::Files(parts) => coerce_files(ty, parts),
            // Explicit JSON null counts as not sent
            Input::Raw(_) | Input::Absent => {
                if field.is_required() {
                    self.reject(schema, source, path, ErrorKind::Missing, "field required");
                    return None;
                }
                return Some(match field.default_value() {
                    // Defaults were checked when the registry was built
                    Some(default) => coerce_default(ty, default).unwrap_or(Value::Null),
                    None => Value::Null,
                });
            }
        };

        let value = match coerced {
            Ok(value) => value,
            Err(m) => {
                let kind = ErrorKind::TypeMismatch {
                    expected: m.expected,
                };
                self.reject(schema, source, path, kind, m.message);
                return None;
            }
        };
        tracing::trace!(schema = %schema.name(), field = %path.join("."), state = %Resolution::Coerced, "field coerced");

        let membership = match ty {
            FieldType::Enum(members) => check_enum(members, &value),
            _ => Ok(()),
        };
        let checked = membership.and_then(|()| {
            field
                .constraints()
                .iter()
                .try_for_each(|constraint| constraint.check(&value))
        });

        match checked {
            Ok(()) => {
                tracing::trace!(schema = %schema.name(), field = %path.join("."), state = %Resolution::Validated, "field validated");
                Some(value)
            }
            Err(violation) => {
                let kind = ErrorKind::ConstraintViolation {
                    constraint: violation.constraint(),
                };
                self.reject(schema, source, path, kind, violation.into_message());
                None
            }
        }
    }

    fn object(
        &mut self,
        nested: &str,
        mut members: Map<String, Json>,
        source: Source,
        path: &[String],
    ) -> Option<Value> {
        let Some(schema) = self.registry.get(nested).cloned() else {
            // The registry refuses to build with dangling nested schemas
            let location = ErrorLocation::new(nested, source, path.to_vec());
            self.report.push(ValidationError::new(
                location,
                ErrorKind::TypeMismatch { expected: "dict" },
                "unknown nested schema",
            ));
            return None;
        };

        let errors_before = self.report.len();
        let mut entity = Entity::new(schema.name());

        for field in schema.fields() {
            let input = match members.remove(field.name()) {
                Some(member) => Input::Raw(RawValue::Json(member)),
                None => Input::Absent,
            };
            let mut nested_path = path.to_vec();
            nested_path.push(field.name().to_string());

            if let Some(value) = self.field(&schema, field, input, source, &nested_path) {
                entity.insert(field.name(), value);
            }
        }

        (self.report.len() == errors_before).then(|| Value::Object(entity))
    }
}

fn coerce_scalar(ty: &FieldType, raw: RawValue) -> Result<Value, Mismatch> {
    match (ty, raw) {
        (FieldType::String, RawValue::Text(s) | RawValue::Json(Json::String(s))) => {
            Ok(Value::String(s))
        }
        (FieldType::Secret, RawValue::Text(s) | RawValue::Json(Json::String(s))) => {
            Ok(Value::Secret(Secret::new(s)))
        }
        (FieldType::Enum(_), RawValue::Text(s) | RawValue::Json(Json::String(s))) => {
            Ok(Value::Enum(s))
        }
        (FieldType::Integer, RawValue::Text(s) | RawValue::Json(Json::String(s))) => {
            s.parse().map(Value::Integer).map_err(|_| mismatch(ty))
        }
        (FieldType::Integer, RawValue::Json(Json::Number(n))) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .map(Value::Integer)
            .ok_or_else(|| mismatch(ty)),
        (FieldType::Boolean, RawValue::Text(s) | RawValue::Json(Json::String(s))) => {
            parse_bool(&s).map(Value::Boolean).ok_or_else(|| mismatch(ty))
        }
        (FieldType::Boolean, RawValue::Json(Json::Bool(b))) => Ok(Value::Boolean(b)),
        (FieldType::Boolean, RawValue::Json(Json::Number(n))) => match n.as_i64() {
            Some(0) => Ok(Value::Boolean(false)),
            Some(1) => Ok(Value::Boolean(true)),
            _ => Err(mismatch(ty)),
        },
        (ty, _) => Err(mismatch(ty)),
    }
}

fn coerce_files(ty: &FieldType, mut parts: Vec<FilePart>) -> Result<Value, Mismatch> {
    match ty {
        FieldType::File if parts.len() == 1 => parts.pop().map(Value::File).ok_or_else(|| mismatch(ty)),
        FieldType::FileList => Ok(Value::Files(parts)),
        _ => Err(mismatch(ty)),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::bind;
    use crate::constraint::Constraint;
    use crate::schema::SchemaDef;
    use crate::web::RequestAdapter;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builder()
            .define(
                SchemaDef::new("Location")
                    .field(FieldDef::new("city", FieldType::String, Source::Body).constraint(Constraint::MinLength(1)))
                    .field(FieldDef::new("country", FieldType::String, Source::Body)),
            )
            .define(
                SchemaDef::new("Person")
                    .field(
                        FieldDef::new("first_name", FieldType::String, Source::Body)
                            .constraint(Constraint::MinLength(1))
                            .constraint(Constraint::MaxLength(5)),
                    )
                    .field(
                        FieldDef::new("age", FieldType::Integer, Source::Body)
                            .constraint(Constraint::Gt(0))
                            .constraint(Constraint::Le(115)),
                    )
                    .field(
                        FieldDef::new("hair_color", FieldType::enumeration(["white", "brown", "black"]), Source::Body)
                            .optional(),
                    )
                    .field(FieldDef::new("is_married", FieldType::Boolean, Source::Body).default(false))
                    .field(FieldDef::new("location", FieldType::object("Location"), Source::Body).optional()),
            )
            .define(
                SchemaDef::new("Query")
                    .field(FieldDef::new("age", FieldType::Integer, Source::Query))
                    .field(FieldDef::new("verbose", FieldType::Boolean, Source::Query).optional()),
            )
            .build()
            .unwrap()
    }

    fn run(schema: &str, request: &mut RequestAdapter) -> Result<Verified<Entity>, ValidationReport> {
        run_with(schema, request, &EngineConfig::default())
    }

    fn run_with(
        schema: &str,
        request: &mut RequestAdapter,
        config: &EngineConfig,
    ) -> Result<Verified<Entity>, ValidationReport> {
        let registry = registry();
        let bound = bind(registry.schema(schema).unwrap(), request, config).unwrap();
        validate(&registry, bound, config)
    }

    fn body(doc: Json) -> RequestAdapter {
        let mut request = RequestAdapter::new("req-test");
        request.set_body(doc);
        request
    }

    #[test]
    fn valid_body_materializes_entity() {
        let mut request = body(json!({
            "first_name": "Bruce",
            "age": 30,
            "hair_color": "black",
            "location": { "city": "Gotham", "country": "USA" }
        }));

        let entity = run("Person", &mut request).unwrap().into_inner();

        assert_eq!(entity.get_str("first_name"), Some("Bruce"));
        assert_eq!(entity.get_i64("age"), Some(30));
        assert_eq!(entity.get_str("hair_color"), Some("black"));
        assert_eq!(entity.get_bool("is_married"), Some(false));
        assert_eq!(entity.get_object("location").unwrap().get_str("city"), Some("Gotham"));
    }

    #[test]
    fn every_failing_field_is_reported() {
        let mut request = body(json!({ "hair_color": "purple" }));

        let report = run("Person", &mut request).unwrap_err();

        assert_eq!(report.len(), 3);
        assert_eq!(report.errors()[0].kind(), ErrorKind::Missing);
        assert_eq!(report.errors()[0].location().field(), "first_name");
        assert_eq!(report.errors()[1].location().field(), "age");
        assert_eq!(
            report.errors()[2].kind(),
            ErrorKind::ConstraintViolation { constraint: "enum" }
        );
    }

    #[test]
    fn first_violated_constraint_only() {
        // Violates only max_length; min_length holds
        let mut request = body(json!({ "first_name": "Barbara", "age": 0 }));

        let report = run("Person", &mut request).unwrap_err();

        assert_eq!(report.len(), 2);
        let name = report.for_field("first_name").unwrap();
        assert_eq!(name.kind(), ErrorKind::ConstraintViolation { constraint: "max_length" });
        let age = report.for_field("age").unwrap();
        assert_eq!(age.message(), "ensure this value is greater than 0");
    }

    #[test]
    fn type_mismatch_skips_constraints() {
        let mut request = body(json!({ "first_name": "Bruce", "age": "thirty" }));

        let report = run("Person", &mut request).unwrap_err();

        assert_eq!(report.len(), 1);
        assert_eq!(
            report.errors()[0].kind(),
            ErrorKind::TypeMismatch { expected: "integer" }
        );
        assert_eq!(report.errors()[0].message(), "value is not a valid integer");
    }

    #[test]
    fn nested_errors_carry_qualified_path() {
        let mut request = body(json!({
            "first_name": "Bruce",
            "age": 30,
            "location": { "city": "" }
        }));

        let report = run("Person", &mut request).unwrap_err();

        assert_eq!(report.len(), 2);
        let city = report.for_field("location.city").unwrap();
        assert_eq!(city.location().schema(), "Location");
        assert_eq!(city.location().loc(), ["body", "location", "city"]);
        assert!(report.for_field("location.country").is_some());
    }

    #[test]
    fn nested_field_must_be_an_object() {
        let mut request = body(json!({ "first_name": "Bruce", "age": 30, "location": "Gotham" }));

        let report = run("Person", &mut request).unwrap_err();
        assert_eq!(
            report.for_field("location").unwrap().kind(),
            ErrorKind::TypeMismatch { expected: "dict" }
        );
    }

    #[test]
    fn null_is_treated_as_absent() {
        let mut request = body(json!({ "first_name": "Bruce", "age": 30, "hair_color": null }));
        let entity = run("Person", &mut request).unwrap().into_inner();
        assert!(entity.get("hair_color").unwrap().is_null());

        let mut request = body(json!({ "first_name": null, "age": 30 }));
        let report = run("Person", &mut request).unwrap_err();
        assert_eq!(report.errors()[0].kind(), ErrorKind::Missing);
    }

    #[test]
    fn query_strings_are_coerced() {
        let mut request = RequestAdapter::new("req-q");
        request.add_query_param("age", "42");
        request.add_query_param("verbose", "Yes");

        let entity = run("Query", &mut request).unwrap().into_inner();
        assert_eq!(entity.get_i64("age"), Some(42));
        assert_eq!(entity.get_bool("verbose"), Some(true));
    }

    #[test]
    fn unparsable_boolean_is_a_mismatch() {
        let mut request = RequestAdapter::new("req-q");
        request.add_query_param("age", "42");
        request.add_query_param("verbose", "maybe");

        let report = run("Query", &mut request).unwrap_err();
        assert_eq!(report.errors()[0].location().loc(), ["query", "verbose"]);
    }

    #[test]
    fn max_errors_truncates_report() {
        let mut request = body(json!({ "location": {} }));
        let config = EngineConfig::default().with_max_errors(1);

        let report = run_with("Person", &mut request, &config).unwrap_err();

        // first_name, age, location.city, location.country
        assert_eq!(report.len(), 1);
        assert_eq!(report.omitted(), 3);
    }

    #[test]
    fn json_number_coercions() {
        assert!(matches!(
            coerce_scalar(&FieldType::Integer, RawValue::json(7.0)),
            Ok(Value::Integer(7))
        ));
        assert!(coerce_scalar(&FieldType::Integer, RawValue::json(7.5)).is_err());
        assert!(matches!(
            coerce_scalar(&FieldType::Boolean, RawValue::json(0)),
            Ok(Value::Boolean(false))
        ));
        assert!(coerce_scalar(&FieldType::Boolean, RawValue::json(2)).is_err());
        assert!(coerce_scalar(&FieldType::String, RawValue::json(12)).is_err());
    }

    #[test]
    fn defaults_are_coerced() {
        assert!(matches!(
            coerce_default(&FieldType::Integer, &json!(3)),
            Ok(Value::Integer(3))
        ));
        assert!(coerce_default(&FieldType::Integer, &json!("x")).is_err());
        assert!(coerce_default(&FieldType::enumeration(["a"]), &json!("b")).is_err());
        assert!(coerce_default(&FieldType::object("Location"), &json!({})).is_err());
        assert!(matches!(coerce_default(&FieldType::String, &Json::Null), Ok(Value::Null)));
    }

    #[test]
    fn single_file_field_rejects_many_parts() {
        let parts = vec![
            FilePart::from_bytes("a", "text/plain", vec![]),
            FilePart::from_bytes("b", "text/plain", vec![]),
        ];
        assert!(coerce_files(&FieldType::File, parts).is_err());

        let parts = vec![FilePart::from_bytes("a", "text/plain", vec![])];
        assert!(matches!(coerce_files(&FieldType::File, parts), Ok(Value::File(_))));
    }

    mod proptests {
        use super::*;
        use crate::test_utils::{arb_non_numeric, arb_text};
        use proptest::prelude::*;

        proptest! {
            /// Property: text that does not parse as an integer is a type mismatch
            #[test]
            fn proptest_non_numeric_age_is_type_mismatch(age in arb_non_numeric(16)) {
                let mut request = RequestAdapter::new("req-prop");
                request.add_query_param("age", age);

                let report = run("Query", &mut request).unwrap_err();

                prop_assert_eq!(report.len(), 1);
                prop_assert_eq!(
                    report.errors()[0].kind(),
                    ErrorKind::TypeMismatch { expected: "integer" }
                );
            }

            /// Property: error messages never echo the submitted value
            #[test]
            fn proptest_messages_do_not_echo_input(text in arb_text(24)) {
                let age = format!("zzq:{}", text);
                let mut request = RequestAdapter::new("req-prop");
                request.add_query_param("age", age.clone());

                let report = run("Query", &mut request).unwrap_err();

                prop_assert!(!report.to_json().to_string().contains(&age));
            }
        }
    }
}
