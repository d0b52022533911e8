//! Verify request construction against JSON test vectors stored in `test-vectors/`.
//!
//! Bodies are compared as parsed JSON rather than raw strings so field
//! ordering cannot cause false negatives.

use petstore_core::{HttpMethod, PetStoreClient, Resource};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct Vectors {
    base_url: String,
    api_key: String,
    cases: Vec<VectorCase>,
}

#[derive(Deserialize)]
struct VectorCase {
    name: String,
    input: Input,
    expected_request: ExpectedRequest,
}

#[derive(Deserialize)]
struct Input {
    method: HttpMethod,
    resource: String,
    key: Option<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

#[derive(Deserialize)]
struct ExpectedRequest {
    method: HttpMethod,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

fn parse_resource(s: &str) -> Resource {
    match s {
        "pet" => Resource::Pet,
        "store" => Resource::Store,
        "user" => Resource::User,
        other => panic!("unknown resource: {other}"),
    }
}

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Vectors = serde_json::from_str(raw).unwrap();
    let client = PetStoreClient::new(&vectors.base_url, &vectors.api_key).unwrap();

    for case in &vectors.cases {
        let name = &case.name;
        let input = &case.input;
        let query: Vec<(&str, &str)> = input
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let req = client
            .build(
                input.method,
                parse_resource(&input.resource),
                input.key.as_deref(),
                &query,
                input.body.as_ref(),
            )
            .unwrap();

        let expected = &case.expected_request;
        assert_eq!(req.method, expected.method, "{name}: method");
        assert_eq!(
            req.url,
            format!("{}{}", vectors.base_url, expected.path),
            "{name}: url"
        );
        assert_eq!(req.headers, expected.headers, "{name}: headers");

        let body: Option<Value> = req
            .body
            .as_deref()
            .map(|b| serde_json::from_str(b).unwrap());
        assert_eq!(body, expected.body, "{name}: body");
    }
}
