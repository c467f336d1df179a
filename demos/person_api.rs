//! Person API walkthrough.
//!
//! Sends a handful of requests through the person endpoints and prints what
//! a host server would answer:
//! 1. A valid create, with the password projected away
//! 2. An invalid create, with every failure reported at once
//! 3. Path detail for a known and an unknown id
//! 4. A contact form reading a header and a cookie
//! 5. Single and multiple file uploads
//!
//! Run with: `cargo run --example person_api`

use binding_core::web::example_handler::PersonApi;
use binding_core::web::{RequestAdapter, Response};
use binding_core::FilePart;
use serde_json::json;

/// Simulates request id generation
mod request_id {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(1);

    pub fn next() -> String {
        format!("req-{:04}", COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

fn print_response(label: &str, response: &Response) {
    let mark = if response.is_success() { "✓" } else { "✗" };
    println!("{} {} -> {}", mark, label, response.status);
    match serde_json::to_string_pretty(&response.body) {
        Ok(body) => println!("{}\n", body),
        Err(e) => eprintln!("   could not render body: {}\n", e),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let api = PersonApi::new()?;

    println!("=== Person API ===\n");

    println!("--- Scenario 1: Create a person ---");
    let mut request = RequestAdapter::new(request_id::next());
    request.set_body(json!({
        "first_name": "Bruce",
        "last_name": "Wayne",
        "age": 30,
        "hair_color": "black",
        "is_married": false,
        "password": "i-am-batman"
    }));
    print_response("POST /person/new", &api.create_person(&mut request));

    println!("--- Scenario 2: Invalid person ---");
    let mut request = RequestAdapter::new(request_id::next());
    request.set_body(json!({
        "first_name": "",
        "age": "one hundred",
        "hair_color": "green",
        "password": "short"
    }));
    print_response("POST /person/new", &api.create_person(&mut request));

    println!("--- Scenario 3: Existence check ---");
    for id in ["117", "42"] {
        let mut request = RequestAdapter::new(request_id::next());
        request.add_path_param("person_id", id);
        print_response(&format!("GET /person/detail/{}", id), &api.show_person_by_path(&mut request));
    }

    println!("--- Scenario 4: Contact form ---");
    let mut request = RequestAdapter::new(request_id::next());
    request.add_form_field("first_name", "Alfred");
    request.add_form_field("last_name", "Pennyworth");
    request.add_form_field("email", "alfred@wayne.com");
    request.add_form_field("message", "Master Wayne will be late for dinner.");
    request.add_header("User-Agent", "demo/1.0");
    request.add_cookie("ads", "none");
    print_response("POST /contact", &api.contact(&mut request));

    println!("--- Scenario 5: Uploads ---");
    let mut request = RequestAdapter::new(request_id::next());
    request.add_file("image", FilePart::from_bytes("signal.png", "image/png", vec![0u8; 2048]));
    print_response("POST /post-image", &api.post_image(&mut request));

    let mut request = RequestAdapter::new(request_id::next());
    request.add_file("images", FilePart::from_bytes("cowl.png", "image/png", vec![0u8; 4096]));
    request.add_file("images", FilePart::from_bytes("cape.jpg", "image/jpeg", vec![0u8; 1536]));
    print_response("POST /post-images", &api.post_images(&mut request));

    Ok(())
}
