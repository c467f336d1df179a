//! A small person API built on the binding engine.
//!
//! This module shows realistic endpoint declarations and handlers without
//! requiring actual HTTP infrastructure. Each [`PersonApi`] method takes a
//! populated [`RequestAdapter`] and returns the [`Response`] a host server
//! would send.
//!
//! **These examples are for documentation and testing only.**
//!
//! # Examples
//!
//! ```
//! use binding_core::web::{example_handler::PersonApi, RequestAdapter};
//!
//! let api = PersonApi::new().expect("schemas resolve");
//!
//! let mut request = RequestAdapter::new("req-001");
//! request.add_path_param("person_id", "117");
//! let response = api.show_person_by_path(&mut request);
//!
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body["name"], "Bruce");
//! ```

use std::sync::Arc;

use serde_json::{json, Map, Value as Json};

use crate::constraint::Constraint;
use crate::context::HandlerContext;
use crate::engine::Engine;
use crate::error::{Error, SchemaDefinitionError};
use crate::projector::Projectable;
use crate::repository::InMemoryRegistry;
use crate::schema::{FieldDef, FieldType, SchemaDef, SchemaRegistry, Source};
use crate::upload::measure_all;
use crate::value::{Entity, Value};
use crate::verified::Verified;

use super::{dispatch, Endpoint, Method, RequestAdapter, Response};

/// Identifiers known to the person collection at startup.
pub const DEFAULT_PERSON_IDS: [i64; 6] = [1, 2, 3, 4, 5, 117];

/// Accepted hair colors.
pub const HAIR_COLORS: [&str; 5] = ["white", "brown", "black", "blonde", "red"];

fn name_field(name: &str, source: Source, max: usize) -> FieldDef {
    FieldDef::new(name, FieldType::String, source)
        .constraint(Constraint::MinLength(1))
        .constraint(Constraint::MaxLength(max))
}

fn body(name: &str, ty: FieldType) -> FieldDef {
    FieldDef::new(name, ty, Source::Body)
}

fn person_id() -> FieldDef {
    FieldDef::new("person_id", FieldType::Integer, Source::Path)
        .constraint(Constraint::Gt(0))
        .title("Person Id")
        .description("This is the person id. It's required")
}

/// Builds the schema registry for every endpoint of the API.
///
/// # Errors
///
/// Returns `SchemaDefinitionError` if the schema graph does not resolve.
pub fn person_schemas() -> Result<SchemaRegistry, SchemaDefinitionError> {
    SchemaRegistry::builder()
        .define(
            SchemaDef::new("Location")
                .field(name_field("city", Source::Body, 20).example("Gotham"))
                .field(name_field("state", Source::Body, 20).example("New Jersey"))
                .field(name_field("country", Source::Body, 20).example("USA")),
        )
        .define(
            SchemaDef::new("PersonBase")
                .field(name_field("first_name", Source::Body, 50).example("Bruce"))
                .field(name_field("last_name", Source::Body, 50).example("Wayne"))
                .field(
                    body("age", FieldType::Integer)
                        .constraint(Constraint::Gt(0))
                        .constraint(Constraint::Le(130))
                        .example(30),
                )
                .field(body("hair_color", FieldType::enumeration(HAIR_COLORS)).optional())
                .field(body("is_married", FieldType::Boolean).optional()),
        )
        .define(
            SchemaDef::new("Person").extends("PersonBase").field(
                body("password", FieldType::Secret).constraint(Constraint::MinLength(8)),
            ),
        )
        .define(SchemaDef::new("PersonOut").extends("Person").hide("password"))
        .define(
            SchemaDef::new("PersonLocationOut")
                .extends("PersonOut")
                .field(body("city", FieldType::String))
                .field(body("state", FieldType::String))
                .field(body("country", FieldType::String)),
        )
        .define(SchemaDef::new("Home"))
        .define(SchemaDef::new("Greeting").field(body("Hello", FieldType::String)))
        .define(SchemaDef::new("CreatePerson").field(
            body("person", FieldType::object("Person")).whole_body(),
        ))
        .define(
            SchemaDef::new("PersonQuery")
                .field(
                    name_field("name", Source::Query, 50)
                        .optional()
                        .title("Person name")
                        .description("This is the person name. It's between 1-50 characters"),
                )
                .field(
                    FieldDef::new("age", FieldType::Integer, Source::Query)
                        .constraint(Constraint::Gt(0))
                        .title("Person age")
                        .description("This is the person age. It's required"),
                ),
        )
        .define(
            SchemaDef::new("NameAgeOut")
                .field(body("name", FieldType::String))
                .field(body("age", FieldType::Integer)),
        )
        .define(SchemaDef::new("PersonPath").field(person_id()))
        .define(
            SchemaDef::new("PersonDetailOut")
                .field(body("person_id", FieldType::Integer))
                .field(body("name", FieldType::String))
                .field(body("age", FieldType::Integer)),
        )
        .define(
            SchemaDef::new("UpdatePerson")
                .field(person_id())
                .field(body("person", FieldType::object("Person")).title("The person to update"))
                .field(body("location", FieldType::object("Location")).title("The person's location")),
        )
        .define(
            SchemaDef::new("Login")
                .field(FieldDef::new("username", FieldType::String, Source::Form).constraint(Constraint::MaxLength(20)))
                .field(FieldDef::new("password", FieldType::Secret, Source::Form)),
        )
        .define(SchemaDef::new("LoginOut").extends("Login").hide("password"))
        .define(
            SchemaDef::new("ContactForm")
                .field(name_field("first_name", Source::Form, 20))
                .field(name_field("last_name", Source::Form, 20))
                .field(FieldDef::new("email", FieldType::String, Source::Form).constraint(Constraint::Email))
                .field(FieldDef::new("message", FieldType::String, Source::Form).constraint(Constraint::MinLength(20)))
                .field(FieldDef::new("user_agent", FieldType::String, Source::Header).optional())
                .field(FieldDef::new("ads", FieldType::String, Source::Cookie).optional()),
        )
        .define(SchemaDef::new("ContactOut").field(body("user_agent", FieldType::String)))
        .define(SchemaDef::new("ImageUpload").field(FieldDef::new("image", FieldType::File, Source::File)))
        .define(SchemaDef::new("ImagesUpload").field(FieldDef::new("images", FieldType::FileList, Source::File)))
        .define(
            SchemaDef::new("UploadedFileOut")
                .field(body("filename", FieldType::String))
                .field(body("content_type", FieldType::String))
                .field(body("size", FieldType::String))
                .field(body("unit", FieldType::String)),
        )
        .define(SchemaDef::new("UploadedFilesOut").field(FieldDef::new("images", FieldType::FileList, Source::File)))
        .build()
}

/// Every endpoint of the API.
pub fn person_endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::new("home", Method::Get, "/", "Home", "Greeting"),
        Endpoint::new("create_person", Method::Post, "/person/new", "CreatePerson", "PersonOut").created(),
        Endpoint::new("show_person_by_query", Method::Get, "/person/detail", "PersonQuery", "NameAgeOut"),
        Endpoint::new("show_person_by_path", Method::Get, "/person/detail/{person_id}", "PersonPath", "PersonDetailOut"),
        Endpoint::new("update_person", Method::Put, "/person/{person_id}", "UpdatePerson", "PersonLocationOut"),
        Endpoint::new("login", Method::Post, "/login", "Login", "LoginOut"),
        Endpoint::new("contact", Method::Post, "/contact", "ContactForm", "ContactOut"),
        Endpoint::new("post_image", Method::Post, "/post-image", "ImageUpload", "UploadedFileOut"),
        Endpoint::new("post_images", Method::Post, "/post-images", "ImagesUpload", "UploadedFilesOut"),
    ]
}

/// `GET /`
pub fn home(_ctx: &HandlerContext, _input: Verified<Entity>) -> Result<Json, Error> {
    Ok(json!({ "Hello": "World" }))
}

/// `POST /person/new`: echoes the new person; the password is projected away.
pub fn create_person(ctx: &HandlerContext, input: Verified<Entity>) -> Result<Map<String, Json>, Error> {
    let person = input
        .as_ref()
        .get_object("person")
        .map(Entity::to_json_map)
        .unwrap_or_default();
    ctx.log().info(format_args!("created person with {} fields", person.len()));
    Ok(person)
}

/// `GET /person/detail?name=..&age=..`
pub fn show_person_by_query(_ctx: &HandlerContext, input: Verified<Entity>) -> Result<Verified<Entity>, Error> {
    Ok(input)
}

/// `GET /person/detail/{person_id}`: 404 unless the id is known.
pub fn show_person_by_path(ctx: &HandlerContext, input: Verified<Entity>) -> Result<Json, Error> {
    let id = input.as_ref().get_i64("person_id").unwrap_or_default();
    ctx.require_exists("Person", id)?;
    Ok(json!({ "person_id": id, "name": "Bruce", "age": 30 }))
}

/// `PUT /person/{person_id}`: merges the person and location documents.
pub fn update_person(_ctx: &HandlerContext, input: Verified<Entity>) -> Result<Map<String, Json>, Error> {
    let input = input.as_ref();
    let mut merged = Map::new();
    for part in ["person", "location"] {
        if let Some(entity) = input.get_object(part) {
            merged.extend(entity.to_json_map());
        }
    }
    Ok(merged)
}

/// `POST /login`: answers with the username only.
pub fn login(ctx: &HandlerContext, input: Verified<Entity>) -> Result<Verified<Entity>, Error> {
    let username = input.as_ref().get_str("username").unwrap_or_default();
    ctx.log().info(format_args!("login attempt for {}", username));
    Ok(input)
}

/// `POST /contact`: answers with the caller's user agent.
pub fn contact(ctx: &HandlerContext, input: Verified<Entity>) -> Result<Verified<Entity>, Error> {
    if let Some(ads) = input.as_ref().get_str("ads") {
        ctx.log().debug(format_args!("contact form carried ads cookie of {} chars", ads.chars().count()));
    }
    Ok(input)
}

/// `POST /post-image`: measures the uploaded file.
pub fn post_image(ctx: &HandlerContext, input: Verified<Entity>) -> Result<Json, Error> {
    match input.into_inner().into_value("image") {
        Some(Value::File(part)) => Ok(part.measure()?.describe(ctx.size_unit())),
        _ => Ok(Json::Null),
    }
}

/// `POST /post-images`: measures every uploaded file, in order.
pub fn post_images(ctx: &HandlerContext, input: Verified<Entity>) -> Result<Json, Error> {
    let uploaded = match input.into_inner().into_value("images") {
        Some(Value::Files(parts)) => measure_all(parts)?,
        _ => Vec::new(),
    };
    let described: Vec<Json> = uploaded
        .iter()
        .map(|file| file.describe(ctx.size_unit()))
        .collect();
    Ok(json!({ "images": described }))
}

/// The person API: an engine over [`person_schemas`] plus the identifier
/// collection behind the existence check.
#[derive(Debug, Clone)]
pub struct PersonApi {
    engine: Engine,
    people: Arc<InMemoryRegistry>,
}

impl PersonApi {
    /// Builds the API with [`DEFAULT_PERSON_IDS`].
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError` if the schemas do not resolve.
    pub fn new() -> Result<Self, SchemaDefinitionError> {
        Self::with_people(Arc::new(InMemoryRegistry::new(DEFAULT_PERSON_IDS)))
    }

    /// Builds the API over an existing identifier collection.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError` if the schemas do not resolve.
    pub fn with_people(people: Arc<InMemoryRegistry>) -> Result<Self, SchemaDefinitionError> {
        Ok(Self {
            engine: Engine::new(person_schemas()?),
            people,
        })
    }

    /// Replaces the engine, e.g. to change its configuration.
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    /// The engine serving the API.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The identifier collection.
    pub fn people(&self) -> &Arc<InMemoryRegistry> {
        &self.people
    }

    fn run<F, O>(&self, name: &str, request: &mut RequestAdapter, handler: F) -> Response
    where
        F: FnOnce(&HandlerContext, Verified<Entity>) -> Result<O, Error>,
        O: Projectable,
    {
        let Some(endpoint) = person_endpoints().into_iter().find(|e| e.name() == name) else {
            return Response::from_error(&Error::from(SchemaDefinitionError::UnknownSchema {
                schema: name.to_string(),
            }));
        };
        let ctx = HandlerContext::new(request.request_id(), self.people.clone());
        dispatch(&self.engine, &endpoint, ctx, request, handler)
    }

    /// `GET /`
    pub fn home(&self, request: &mut RequestAdapter) -> Response {
        self.run("home", request, home)
    }

    /// `POST /person/new`
    pub fn create_person(&self, request: &mut RequestAdapter) -> Response {
        self.run("create_person", request, create_person)
    }

    /// `GET /person/detail`
    pub fn show_person_by_query(&self, request: &mut RequestAdapter) -> Response {
        self.run("show_person_by_query", request, show_person_by_query)
    }

    /// `GET /person/detail/{person_id}`
    pub fn show_person_by_path(&self, request: &mut RequestAdapter) -> Response {
        self.run("show_person_by_path", request, show_person_by_path)
    }

    /// `PUT /person/{person_id}`
    pub fn update_person(&self, request: &mut RequestAdapter) -> Response {
        self.run("update_person", request, update_person)
    }

    /// `POST /login`
    pub fn login(&self, request: &mut RequestAdapter) -> Response {
        self.run("login", request, login)
    }

    /// `POST /contact`
    pub fn contact(&self, request: &mut RequestAdapter) -> Response {
        self.run("contact", request, contact)
    }

    /// `POST /post-image`
    pub fn post_image(&self, request: &mut RequestAdapter) -> Response {
        self.run("post_image", request, post_image)
    }

    /// `POST /post-images`
    pub fn post_images(&self, request: &mut RequestAdapter) -> Response {
        self.run("post_images", request, post_images)
    }
}
