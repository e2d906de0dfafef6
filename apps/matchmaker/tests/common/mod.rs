#![allow(dead_code)]

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::{HeaderName, CONTENT_TYPE};
use actix_web::test;
use serde_json::Value;

// Logging is auto-installed for every test binary that declares `mod common;`
#[ctor::ctor]
fn init_logging() {
    matchmaker_test_support::logging::init();
}

/// Assert a problem+json error response and return its body.
pub async fn assert_problem_details(
    resp: ServiceResponse<BoxBody>,
    expected_status: u16,
    expected_code: &str,
) -> Value {
    assert_eq!(resp.status().as_u16(), expected_status);

    let headers = resp.headers().clone();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(
        content_type.starts_with("application/problem+json"),
        "unexpected content type {content_type}"
    );

    let trace_hdr = HeaderName::from_static("x-trace-id");
    let header_trace_id = headers
        .get(&trace_hdr)
        .and_then(|v| v.to_str().ok())
        .expect("x-trace-id header should be present")
        .to_string();

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], expected_code);
    assert_eq!(body["status"], expected_status);
    assert_eq!(
        body["trace_id"].as_str().expect("trace_id should be a string"),
        header_trace_id,
        "trace_id in body should match x-trace-id header"
    );
    body
}
