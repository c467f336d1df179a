//! Schema registry: named field sets, inheritance and one-time resolution.
//!
//! Schemas are described with [`SchemaDef`] and resolved together by
//! [`SchemaRegistryBuilder::build`]. Resolution flattens every `extends`
//! chain into a single ordered field list, so nothing walks parents at
//! request time.
//!
//! # Examples
//!
//! ```
//! use binding_core::{FieldDef, FieldType, SchemaDef, SchemaRegistry, Source};
//! use binding_core::constraint::Constraint;
//!
//! let registry = SchemaRegistry::builder()
//!     .define(
//!         SchemaDef::new("PersonBase")
//!             .field(FieldDef::new("first_name", FieldType::String, Source::Body)
//!                 .constraint(Constraint::MinLength(1))
//!                 .constraint(Constraint::MaxLength(50))),
//!     )
//!     .define(
//!         SchemaDef::new("Person")
//!             .extends("PersonBase")
//!             .field(FieldDef::new("password", FieldType::Secret, Source::Body)),
//!     )
//!     .define(SchemaDef::new("PersonOut").extends("Person").hide("password"))
//!     .build()
//!     .expect("schemas resolve");
//!
//! let person = registry.schema("Person").unwrap();
//! assert_eq!(person.field_names().collect::<Vec<_>>(), ["first_name", "password"]);
//!
//! let out = registry.schema("PersonOut").unwrap();
//! assert!(!out.contains("password"));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as Json;

use crate::constraint::Constraint;
use crate::error::SchemaDefinitionError;
use crate::validator::coerce_default;

/// Where in the request a field's raw value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Captured path segment
    Path,
    /// Query string parameter
    Query,
    /// Member of the JSON body document
    Body,
    /// Form field
    Form,
    /// Request header
    Header,
    /// Cookie
    Cookie,
    /// Multipart file part
    File,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path => write!(f, "path"),
            Source::Query => write!(f, "query"),
            Source::Body => write!(f, "body"),
            Source::Form => write!(f, "form"),
            Source::Header => write!(f, "header"),
            Source::Cookie => write!(f, "cookie"),
            Source::File => write!(f, "file"),
        }
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// UTF-8 text
    String,
    /// 64-bit signed integer
    Integer,
    /// Boolean
    Boolean,
    /// One of a fixed set of string values
    Enum(Vec<String>),
    /// Credential text, redacted everywhere
    Secret,
    /// Instance of another registered schema
    Object(String),
    /// One uploaded file
    File,
    /// Any number of uploaded files
    FileList,
}

impl FieldType {
    /// Builds an [`FieldType::Enum`] from string slices.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldType::Enum(values.into_iter().map(Into::into).collect())
    }

    /// Builds an [`FieldType::Object`] referring to `schema`.
    pub fn object(schema: impl Into<String>) -> Self {
        FieldType::Object(schema.into())
    }

    /// Whether a child may override a parent field of type `self` with `other`.
    ///
    /// Enum overrides may change the member set; nested objects must keep
    /// the same schema.
    pub fn is_compatible_with(&self, other: &FieldType) -> bool {
        match (self, other) {
            (FieldType::Enum(_), FieldType::Enum(_)) => true,
            (FieldType::Object(a), FieldType::Object(b)) => a == b,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }

    fn is_file(&self) -> bool {
        matches!(self, FieldType::File | FieldType::FileList)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Enum(_) => write!(f, "enum"),
            FieldType::Secret => write!(f, "secret"),
            FieldType::Object(name) => write!(f, "object<{}>", name),
            FieldType::File => write!(f, "file"),
            FieldType::FileList => write!(f, "list<file>"),
        }
    }
}

/// Documentation-only metadata for a field.
///
/// Kept beside the schema's fields, never consulted by validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    /// Short title
    pub title: Option<String>,
    /// Longer description
    pub description: Option<String>,
    /// Example value
    pub example: Option<Json>,
}

impl Annotations {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.example.is_none()
    }
}

/// One named, typed, constrained, sourced slot within a schema.
///
/// Fields are required unless marked [`optional`](Self::optional) or given
/// a [`default`](Self::default).
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: String,
    ty: FieldType,
    source: Source,
    required: bool,
    default: Option<Json>,
    constraints: Vec<Constraint>,
    whole_body: bool,
    annotations: Annotations,
}

impl FieldDef {
    /// Creates a required field.
    pub fn new(name: impl Into<String>, ty: FieldType, source: Source) -> Self {
        Self {
            name: name.into(),
            ty,
            source,
            required: true,
            default: None,
            constraints: Vec::new(),
            whole_body: false,
            annotations: Annotations::default(),
        }
    }

    /// Marks the field required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field optional; absent values become null.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Makes the field optional with a default for absent values.
    pub fn default(mut self, value: impl Into<Json>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    /// Appends a constraint; constraints run in declaration order.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Binds the entire body document instead of the member named like the
    /// field. Used by endpoints with a single body parameter.
    pub fn whole_body(mut self) -> Self {
        self.whole_body = true;
        self
    }

    /// Sets the documentation title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.annotations.title = Some(title.into());
        self
    }

    /// Sets the documentation description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.annotations.description = Some(description.into());
        self
    }

    /// Sets the documentation example.
    pub fn example(mut self, example: impl Into<Json>) -> Self {
        self.annotations.example = Some(example.into());
        self
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn field_type(&self) -> &FieldType {
        &self.ty
    }

    /// Declared source.
    pub fn source(&self) -> Source {
        self.source
    }

    /// Whether the field must be present.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Default used when the field is absent.
    pub fn default_value(&self) -> Option<&Json> {
        self.default.as_ref()
    }

    /// Constraints in declaration order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Whether the field binds the entire body document.
    pub fn binds_whole_body(&self) -> bool {
        self.whole_body
    }

    fn check(&self, schema: &str) -> Result<(), SchemaDefinitionError> {
        if self.required && self.default.is_some() {
            return Err(SchemaDefinitionError::DefaultOnRequired {
                schema: schema.to_string(),
                field: self.name.clone(),
            });
        }

        if let Some(c) = self.constraints.iter().find(|c| !c.applies_to(&self.ty)) {
            return Err(SchemaDefinitionError::InapplicableConstraint {
                schema: schema.to_string(),
                field: self.name.clone(),
                constraint: c.name(),
            });
        }

        let invalid_source = |reason: &str| SchemaDefinitionError::InvalidSource {
            schema: schema.to_string(),
            field: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.ty.is_file() != (self.source == Source::File) {
            return Err(invalid_source("file types bind from the file source only"));
        }
        if self.whole_body && self.source != Source::Body {
            return Err(invalid_source("only body fields can bind the whole body"));
        }
        if matches!(self.ty, FieldType::Object(_)) && self.source != Source::Body {
            return Err(invalid_source("nested objects bind from the body"));
        }

        if let Some(default) = &self.default {
            coerce_default(&self.ty, default).map_err(|reason| {
                SchemaDefinitionError::InvalidDefault {
                    schema: schema.to_string(),
                    field: self.name.clone(),
                    reason,
                }
            })?;
        }

        Ok(())
    }
}

/// Description of a schema before resolution.
#[derive(Debug, Clone)]
pub struct SchemaDef {
    name: String,
    parent: Option<String>,
    fields: Vec<FieldDef>,
    hidden: Vec<String>,
}

impl SchemaDef {
    /// Starts a schema with no parent and no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            hidden: Vec::new(),
        }
    }

    /// Inherits every field of `parent`.
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Adds a field, or overrides the inherited field of the same name.
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Drops an inherited field from this schema.
    pub fn hide(mut self, field: impl Into<String>) -> Self {
        self.hidden.push(field.into());
        self
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A resolved schema: the flattened, ordered field list.
#[derive(Debug)]
pub struct Schema {
    name: String,
    parent: Option<String>,
    fields: Vec<FieldDef>,
    annotations: HashMap<String, Annotations>,
    // Type of every field declared along the extends chain, hidden ones
    // included, so a redeclaration is checked even after a hide.
    lineage: HashMap<String, FieldType>,
}

impl Schema {
    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the parent schema, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Effective fields: inherited ones first, then own additions.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Effective field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldDef::name)
    }

    /// Looks up an effective field.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the effective field set contains `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Documentation annotations for a field, if it has any.
    pub fn annotations(&self, field: &str) -> Option<&Annotations> {
        self.annotations.get(field)
    }

    /// Number of effective fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Immutable, process-wide set of resolved schemas.
///
/// Cheap to share across threads behind an `Arc`; nothing in it changes
/// after [`SchemaRegistryBuilder::build`].
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    /// Starts collecting schema definitions.
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Looks up a resolved schema.
    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }

    /// Looks up a resolved schema, failing for unknown names.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError::UnknownSchema` if `name` was never
    /// defined.
    pub fn schema(&self, name: &str) -> Result<&Arc<Schema>, SchemaDefinitionError> {
        self.get(name)
            .ok_or_else(|| SchemaDefinitionError::UnknownSchema {
                schema: name.to_string(),
            })
    }

    /// Registered schema names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Collects [`SchemaDef`]s and resolves them in one pass.
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    defs: Vec<SchemaDef>,
}

impl SchemaRegistryBuilder {
    /// Adds a definition. Order does not matter; parents may come later.
    pub fn define(mut self, def: SchemaDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Resolves every definition into a flattened schema.
    ///
    /// # Errors
    ///
    /// Returns the first `SchemaDefinitionError` found: duplicate names,
    /// malformed fields, unknown parents or nested schemas, cyclic `extends`
    /// chains, hidden fields the parent lacks, or overrides that change a
    /// field's type.
    pub fn build(self) -> Result<SchemaRegistry, SchemaDefinitionError> {
        let mut defs: HashMap<&str, &SchemaDef> = HashMap::new();
        for def in &self.defs {
            if defs.insert(def.name.as_str(), def).is_some() {
                return Err(SchemaDefinitionError::DuplicateSchema {
                    schema: def.name.clone(),
                });
            }

            let mut seen = HashSet::new();
            for field in &def.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(SchemaDefinitionError::DuplicateField {
                        schema: def.name.clone(),
                        field: field.name.clone(),
                    });
                }
                field.check(&def.name)?;
            }
        }

        let mut resolved: HashMap<String, Arc<Schema>> = HashMap::new();
        for def in &self.defs {
            let mut chain = Vec::new();
            resolve(def.name.as_str(), &defs, &mut resolved, &mut chain)?;
        }

        for schema in resolved.values() {
            for field in &schema.fields {
                if let FieldType::Object(nested) = &field.ty {
                    if !resolved.contains_key(nested) {
                        return Err(SchemaDefinitionError::UnknownNestedSchema {
                            schema: schema.name.clone(),
                            field: field.name.clone(),
                            nested: nested.clone(),
                        });
                    }
                }
            }
        }

        tracing::debug!(schemas = resolved.len(), "schema registry resolved");
        Ok(SchemaRegistry { schemas: resolved })
    }
}

/// Resolves `name` and its ancestors, memoizing into `resolved`.
///
/// `chain` holds the schemas currently being resolved; meeting one of them
/// again means the `extends` relation has a cycle.
fn resolve(
    name: &str,
    defs: &HashMap<&str, &SchemaDef>,
    resolved: &mut HashMap<String, Arc<Schema>>,
    chain: &mut Vec<String>,
) -> Result<Arc<Schema>, SchemaDefinitionError> {
    if let Some(schema) = resolved.get(name) {
        return Ok(Arc::clone(schema));
    }
    if let Some(start) = chain.iter().position(|n| n == name) {
        let mut cycle = chain[start..].to_vec();
        cycle.push(name.to_string());
        return Err(SchemaDefinitionError::Cycle { chain: cycle });
    }

    // Callers only pass names of defined schemas or checked parents.
    let def = defs[name];
    chain.push(name.to_string());

    let (mut fields, mut annotations, mut lineage) = match &def.parent {
        Some(parent) => {
            if !defs.contains_key(parent.as_str()) {
                return Err(SchemaDefinitionError::UnknownParent {
                    schema: def.name.clone(),
                    parent: parent.clone(),
                });
            }
            let parent = resolve(parent, defs, resolved, chain)?;
            (
                parent.fields.clone(),
                parent.annotations.clone(),
                parent.lineage.clone(),
            )
        }
        None => (Vec::new(), HashMap::new(), HashMap::new()),
    };

    for hidden in &def.hidden {
        let before = fields.len();
        fields.retain(|f| &f.name != hidden);
        if fields.len() == before {
            return Err(SchemaDefinitionError::UnknownHiddenField {
                schema: def.name.clone(),
                field: hidden.clone(),
            });
        }
        annotations.remove(hidden);
    }

    for own in &def.fields {
        let mut own = own.clone();
        let notes = std::mem::take(&mut own.annotations);
        if notes.is_empty() {
            annotations.remove(&own.name);
        } else {
            annotations.insert(own.name.clone(), notes);
        }

        if let Some(ancestor) = lineage.get(&own.name) {
            if !ancestor.is_compatible_with(&own.ty) {
                return Err(SchemaDefinitionError::TypeConflict {
                    schema: def.name.clone(),
                    field: own.name.clone(),
                    parent_type: ancestor.to_string(),
                    child_type: own.ty.to_string(),
                });
            }
        }
        lineage.insert(own.name.clone(), own.ty.clone());

        match fields.iter_mut().find(|f| f.name == own.name) {
            Some(inherited) => *inherited = own,
            None => fields.push(own),
        }
    }

    chain.pop();

    let schema = Arc::new(Schema {
        name: def.name.clone(),
        parent: def.parent.clone(),
        fields,
        annotations,
        lineage,
    });
    tracing::trace!(schema = %schema.name, fields = schema.fields.len(), "resolved schema");
    resolved.insert(def.name.clone(), Arc::clone(&schema));
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(name: &str) -> FieldDef {
        FieldDef::new(name, FieldType::String, Source::Body)
    }

    #[test]
    fn flattens_parent_fields_first() {
        let registry = SchemaRegistry::builder()
            .define(SchemaDef::new("Child").extends("Base").field(string("c")))
            .define(SchemaDef::new("Base").field(string("a")).field(string("b")))
            .build()
            .unwrap();

        let child = registry.schema("Child").unwrap();
        assert_eq!(child.field_names().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(child.parent(), Some("Base"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn override_keeps_position_and_replaces_definition() {
        let registry = SchemaRegistry::builder()
            .define(SchemaDef::new("Base").field(string("a")).field(string("b")))
            .define(
                SchemaDef::new("Child")
                    .extends("Base")
                    .field(string("a").optional().constraint(Constraint::MaxLength(3))),
            )
            .build()
            .unwrap();

        let child = registry.schema("Child").unwrap();
        assert_eq!(child.field_names().collect::<Vec<_>>(), ["a", "b"]);
        let a = child.field("a").unwrap();
        assert!(!a.is_required());
        assert_eq!(a.constraints().len(), 1);

        // The parent is untouched
        assert!(registry.schema("Base").unwrap().field("a").unwrap().is_required());
    }

    #[test]
    fn hide_removes_inherited_field() {
        let registry = SchemaRegistry::builder()
            .define(
                SchemaDef::new("Person")
                    .field(string("name"))
                    .field(FieldDef::new("password", FieldType::Secret, Source::Body)),
            )
            .define(SchemaDef::new("PersonOut").extends("Person").hide("password"))
            .build()
            .unwrap();

        let out = registry.schema("PersonOut").unwrap();
        assert!(out.contains("name"));
        assert!(!out.contains("password"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn hiding_unknown_field_fails() {
        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("Base").field(string("a")))
            .define(SchemaDef::new("Child").extends("Base").hide("zzz"))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            SchemaDefinitionError::UnknownHiddenField {
                schema: "Child".into(),
                field: "zzz".into()
            }
        );
    }

    #[test]
    fn detects_cycles() {
        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("A").extends("B"))
            .define(SchemaDef::new("B").extends("C"))
            .define(SchemaDef::new("C").extends("A"))
            .build()
            .unwrap_err();

        match err {
            SchemaDefinitionError::Cycle { chain } => {
                assert_eq!(chain, ["A", "B", "C", "A"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn detects_self_extension() {
        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("Loop").extends("Loop"))
            .build()
            .unwrap_err();

        assert!(matches!(err, SchemaDefinitionError::Cycle { .. }));
    }

    #[test]
    fn rejects_unknown_parent() {
        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("Orphan").extends("Missing"))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            SchemaDefinitionError::UnknownParent {
                schema: "Orphan".into(),
                parent: "Missing".into()
            }
        );
    }

    #[test]
    fn rejects_type_conflict_on_override() {
        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("Base").field(FieldDef::new("age", FieldType::Integer, Source::Body)))
            .define(SchemaDef::new("Child").extends("Base").field(string("age")))
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            SchemaDefinitionError::TypeConflict { ref field, .. } if field == "age"
        ));
    }

    #[test]
    fn rejects_type_change_after_hide() {
        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("Base").field(FieldDef::new("age", FieldType::Integer, Source::Body)))
            .define(SchemaDef::new("Child").extends("Base").hide("age").field(string("age")))
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            SchemaDefinitionError::TypeConflict { ref field, ref parent_type, .. }
                if field == "age" && parent_type == "integer"
        ));
    }

    #[test]
    fn rejects_type_change_below_intermediate_hide() {
        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("Base").field(FieldDef::new("age", FieldType::Integer, Source::Body)))
            .define(SchemaDef::new("Middle").extends("Base").hide("age"))
            .define(SchemaDef::new("Leaf").extends("Middle").field(string("age")))
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            SchemaDefinitionError::TypeConflict { ref schema, ref field, .. }
                if schema == "Leaf" && field == "age"
        ));
    }

    #[test]
    fn hidden_field_may_return_with_same_type() {
        let registry = SchemaRegistry::builder()
            .define(SchemaDef::new("Base").field(FieldDef::new("age", FieldType::Integer, Source::Body)))
            .define(
                SchemaDef::new("Child")
                    .extends("Base")
                    .hide("age")
                    .field(FieldDef::new("age", FieldType::Integer, Source::Query).optional()),
            )
            .build()
            .unwrap();

        let age = registry.schema("Child").unwrap().field("age").unwrap();
        assert_eq!(age.source(), Source::Query);
        assert!(!age.is_required());
    }

    #[test]
    fn enum_override_may_change_members() {
        let registry = SchemaRegistry::builder()
            .define(SchemaDef::new("Base").field(FieldDef::new(
                "color",
                FieldType::enumeration(["red", "blue"]),
                Source::Body,
            )))
            .define(SchemaDef::new("Child").extends("Base").field(FieldDef::new(
                "color",
                FieldType::enumeration(["red"]),
                Source::Body,
            )))
            .build();

        assert!(registry.is_ok());
    }

    #[test]
    fn rejects_duplicates() {
        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("A"))
            .define(SchemaDef::new("A"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaDefinitionError::DuplicateSchema { schema: "A".into() });

        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("A").field(string("x")).field(string("x")))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::DuplicateField { .. }));
    }

    #[test]
    fn rejects_unknown_nested_schema() {
        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("Update").field(FieldDef::new(
                "location",
                FieldType::object("Location"),
                Source::Body,
            )))
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            SchemaDefinitionError::UnknownNestedSchema { ref nested, .. } if nested == "Location"
        ));
    }

    #[test]
    fn rejects_default_on_required_field() {
        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("A").field(string("x").default("d").required()))
            .build()
            .unwrap_err();

        assert!(matches!(err, SchemaDefinitionError::DefaultOnRequired { .. }));
    }

    #[test]
    fn rejects_default_of_wrong_type() {
        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("A").field(
                FieldDef::new("n", FieldType::Integer, Source::Query).default("many"),
            ))
            .build()
            .unwrap_err();

        assert!(matches!(err, SchemaDefinitionError::InvalidDefault { .. }));
    }

    #[test]
    fn rejects_inapplicable_constraint() {
        let err = SchemaRegistry::builder()
            .define(SchemaDef::new("A").field(
                FieldDef::new("n", FieldType::Integer, Source::Query)
                    .constraint(Constraint::MaxLength(3)),
            ))
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            SchemaDefinitionError::InapplicableConstraint { constraint: "max_length", .. }
        ));
    }

    #[test]
    fn rejects_mismatched_sources() {
        let file_from_query = SchemaRegistry::builder()
            .define(SchemaDef::new("A").field(FieldDef::new("f", FieldType::File, Source::Query)))
            .build();
        assert!(matches!(
            file_from_query,
            Err(SchemaDefinitionError::InvalidSource { .. })
        ));

        let whole_query = SchemaRegistry::builder()
            .define(SchemaDef::new("A").field(
                FieldDef::new("q", FieldType::String, Source::Query).whole_body(),
            ))
            .build();
        assert!(matches!(
            whole_query,
            Err(SchemaDefinitionError::InvalidSource { .. })
        ));
    }

    #[test]
    fn annotations_live_beside_fields() {
        let registry = SchemaRegistry::builder()
            .define(SchemaDef::new("Base").field(
                string("first_name")
                    .title("First name")
                    .description("The person's given name")
                    .example("Miguel"),
            ))
            .define(SchemaDef::new("Child").extends("Base"))
            .build()
            .unwrap();

        let child = registry.schema("Child").unwrap();
        let notes = child.annotations("first_name").unwrap();
        assert_eq!(notes.title.as_deref(), Some("First name"));
        assert_eq!(notes.example, Some(Json::from("Miguel")));
        assert!(child.annotations("missing").is_none());
    }

    #[test]
    fn unknown_schema_lookup() {
        let registry = SchemaRegistry::builder().build().unwrap();

        assert!(registry.is_empty());
        assert_eq!(
            registry.schema("Nope").unwrap_err(),
            SchemaDefinitionError::UnknownSchema { schema: "Nope".into() }
        );
    }

    #[test]
    fn type_display() {
        assert_eq!(FieldType::object("Location").to_string(), "object<Location>");
        assert_eq!(FieldType::FileList.to_string(), "list<file>");
        assert_eq!(Source::Cookie.to_string(), "cookie");
    }
}
