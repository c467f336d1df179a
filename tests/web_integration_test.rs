//! Integration tests for the person API.
//!
//! Each test builds a request the way a host server would, runs it through
//! the endpoint and checks the status and body that would go back.

use std::io::{self, Read};
use std::sync::Arc;

use binding_core::web::example_handler::{person_endpoints, PersonApi};
use binding_core::web::{dispatch, Endpoint, Method, RequestAdapter};
use binding_core::{
    Engine, EngineConfig, FilePart, HandlerContext, InMemoryRegistry, SizeUnit,
};
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn api() -> PersonApi {
    init_tracing();
    PersonApi::new().unwrap()
}

fn person() -> serde_json::Value {
    json!({
        "first_name": "Bruce",
        "last_name": "Wayne",
        "age": 30,
        "hair_color": "black",
        "is_married": false,
        "password": "correct horse battery"
    })
}

#[test]
fn every_endpoint_resolves_its_schemas() {
    let api = api();

    for endpoint in person_endpoints() {
        assert!(api.engine().schema(endpoint.input()).is_ok(), "{}", endpoint);
        assert!(api.engine().schema(endpoint.output()).is_ok(), "{}", endpoint);
    }
}

#[test]
fn create_person_full_flow() {
    let mut request = RequestAdapter::new("req-create");
    request.set_body(person());

    let response = api().create_person(&mut request);

    assert_eq!(response.status, 201);
    assert_eq!(
        response.body,
        json!({
            "first_name": "Bruce",
            "last_name": "Wayne",
            "age": 30,
            "hair_color": "black",
            "is_married": false
        })
    );
}

#[test]
fn create_person_rejects_unknown_hair_color() {
    let mut body = person();
    body["hair_color"] = json!("green");
    let mut request = RequestAdapter::new("req-hair");
    request.set_body(body);

    let response = api().create_person(&mut request);

    assert_eq!(response.status, 422);
    let detail = response.body["detail"].as_array().unwrap();
    assert_eq!(detail.len(), 1);
    assert_eq!(detail[0]["loc"], json!(["body", "person", "hair_color"]));
    assert_eq!(detail[0]["type"], "value_error.enum");
}

#[test]
fn path_detail_known_and_unknown_ids() {
    let api = api();

    let mut request = RequestAdapter::new("req-117");
    request.add_path_param("person_id", "117");
    let response = api.show_person_by_path(&mut request);
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({ "person_id": 117, "name": "Bruce", "age": 30 }));

    let mut request = RequestAdapter::new("req-42");
    request.add_path_param("person_id", "42");
    let response = api.show_person_by_path(&mut request);
    assert_eq!(response.status, 404);
    assert_eq!(response.body, json!({ "detail": "Person with id 42 does not exist" }));

    let mut request = RequestAdapter::new("req-0");
    request.add_path_param("person_id", "0");
    let response = api.show_person_by_path(&mut request);
    assert_eq!(response.status, 422);
    assert_eq!(response.body["detail"][0]["type"], "value_error.gt");
}

#[test]
fn inserted_ids_become_visible() {
    let people = Arc::new(InMemoryRegistry::new([1]));
    let api = PersonApi::with_people(Arc::clone(&people)).unwrap();

    let mut request = RequestAdapter::new("req-before");
    request.add_path_param("person_id", "42");
    assert_eq!(api.show_person_by_path(&mut request).status, 404);

    people.insert(42);

    let mut request = RequestAdapter::new("req-after");
    request.add_path_param("person_id", "42");
    assert_eq!(api.show_person_by_path(&mut request).status, 200);
}

#[test]
fn query_detail_requires_age() {
    let mut request = RequestAdapter::new("req-query");
    request.add_query_param("name", "Bruce");

    let response = api().show_person_by_query(&mut request);

    assert_eq!(response.status, 422);
    assert_eq!(response.body["detail"][0]["loc"], json!(["query", "age"]));
    assert_eq!(response.body["detail"][0]["type"], "value_error.missing");
}

#[test]
fn update_person_reports_both_documents() {
    let mut request = RequestAdapter::new("req-update");
    request.add_path_param("person_id", "3");
    request.set_body(json!({
        "person": { "first_name": "Bruce", "age": 30, "password": "correct horse" },
        "location": { "city": "", "state": "New Jersey", "country": "USA" }
    }));

    let response = api().update_person(&mut request);

    assert_eq!(response.status, 422);
    let locs: Vec<_> = response.body["detail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["loc"].clone())
        .collect();
    assert_eq!(
        locs,
        [
            json!(["body", "person", "last_name"]),
            json!(["body", "location", "city"]),
        ]
    );
}

#[test]
fn login_never_echoes_password() {
    let mut request = RequestAdapter::new("req-login");
    request.add_form_field("username", "bruce");
    request.add_form_field("password", "hunter22");

    let response = api().login(&mut request);

    assert_eq!(response.status, 200);
    assert!(!response.body.to_string().contains("hunter22"));
}

#[test]
fn contact_reads_user_agent_header() {
    let mut request = RequestAdapter::new("req-contact");
    request.add_form_field("first_name", "Bruce");
    request.add_form_field("last_name", "Wayne");
    request.add_form_field("email", "bruce@wayne.com");
    request.add_form_field("message", "I would like to talk about bats.");
    request.add_header("User-Agent", "Mozilla/5.0");
    request.add_cookie("ads", "tracking-id");

    let response = api().contact(&mut request);

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({ "user_agent": "Mozilla/5.0" }));
}

#[test]
fn single_upload_reports_kibibytes() {
    let mut request = RequestAdapter::new("req-image");
    request.add_file("image", FilePart::from_bytes("bat.png", "image/png", vec![7u8; 2048]));

    let response = api().post_image(&mut request);

    assert_eq!(response.status, 200);
    assert_eq!(
        response.body,
        json!({ "filename": "bat.png", "content_type": "image/png", "size": "2.00", "unit": "KiB" })
    );
}

#[test]
fn multi_upload_keeps_request_order() {
    let mut request = RequestAdapter::new("req-images");
    request.add_file("images", FilePart::from_bytes("a.png", "image/png", vec![0u8; 2048]));
    request.add_file("images", FilePart::from_bytes("b.jpg", "image/jpeg", vec![0u8; 512]));

    let response = api().post_images(&mut request);

    assert_eq!(response.status, 200);
    let images = response.body["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["filename"], "a.png");
    assert_eq!(images[0]["size"], "2.00");
    assert_eq!(images[1]["filename"], "b.jpg");
    assert_eq!(images[1]["size"], "0.50");
}

#[test]
fn upload_unit_follows_engine_config() {
    let api = api();
    let engine = api
        .engine()
        .clone()
        .with_config(EngineConfig::default().with_size_unit(SizeUnit::Bytes));
    let api = api.with_engine(engine);

    let mut request = RequestAdapter::new("req-bytes");
    request.add_file("image", FilePart::from_bytes("bat.png", "image/png", vec![0u8; 2048]));

    let response = api.post_image(&mut request);

    assert_eq!(response.body["size"], "2048.00");
    assert_eq!(response.body["unit"], "bytes");
}

#[test]
fn missing_upload_is_reported() {
    let response = api().post_image(&mut RequestAdapter::new("req-no-file"));

    assert_eq!(response.status, 422);
    assert_eq!(response.body["detail"][0]["loc"], json!(["file", "image"]));
}

struct BrokenStream;

impl Read for BrokenStream {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away"))
    }
}

#[test]
fn broken_upload_stream_is_a_server_error() {
    let mut request = RequestAdapter::new("req-broken");
    request.add_file("image", FilePart::new("bat.png", "image/png", BrokenStream));

    let response = api().post_image(&mut request);

    assert_eq!(response.status, 500);
    assert_eq!(response.body, json!({ "detail": "Internal Server Error" }));
}

#[test]
fn custom_endpoint_through_dispatch() {
    let api = api();
    let engine: &Engine = api.engine();
    let endpoint = Endpoint::new("echo_query", Method::Get, "/echo", "PersonQuery", "NameAgeOut");
    let ctx = HandlerContext::new("req-echo", Arc::new(InMemoryRegistry::default()));
    let mut request = RequestAdapter::new("req-echo");
    request.add_query_param("name", "Alfred");
    request.add_query_param("age", "70");

    let response = dispatch(engine, &endpoint, ctx, &mut request, |_, input| Ok(input));

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({ "name": "Alfred", "age": 70 }));
}
