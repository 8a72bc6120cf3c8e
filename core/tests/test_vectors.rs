//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or errors. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use todo_core::{
    ApiError, CreateTodo, HttpMethod, HttpRequest, HttpResponse, Todo, TodoClient, UpdateTodo,
};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8000";

fn client() -> TodoClient {
    TodoClient::new(BASE_URL)
}

fn load(raw: &str) -> Vec<serde_json::Value> {
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

/// Check method, path, headers and (parsed) body of a built request.
fn assert_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(
        req.path,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{name}: path"
    );

    let expected_headers: Vec<(String, String)> = expected
        .get("headers")
        .and_then(|h| h.as_array())
        .map(|headers| {
            headers
                .iter()
                .map(|h| {
                    let arr = h.as_array().unwrap();
                    (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
                })
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let req_body: serde_json::Value =
                serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated_response(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

/// Compare an error against the vector's `expected_error` name and optional
/// `expected_detail`.
fn assert_error(name: &str, err: ApiError, case: &serde_json::Value) {
    match (case["expected_error"].as_str().unwrap(), err) {
        ("NotFound", ApiError::NotFound) => {}
        ("Validation", ApiError::Validation { detail }) => {
            if let Some(expected) = case.get("expected_detail") {
                assert_eq!(detail, expected.as_str().unwrap(), "{name}: detail");
            }
        }
        ("HttpError", ApiError::HttpError { status, .. }) => {
            assert_eq!(u64::from(status), case["simulated_response"]["status"].as_u64().unwrap());
        }
        (expected, err) => panic!("{name}: expected {expected}, got {err:?}"),
    }
}

#[test]
fn health_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/health.json")) {
        let name = case["name"].as_str().unwrap();
        assert_request(name, &c.build_health(), &case["expected_request"]);

        let message = c.parse_health(simulated_response(&case)).unwrap();
        assert_eq!(message, case["expected_result"].as_str().unwrap(), "{name}: parsed result");
    }
}

#[test]
fn create_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let input: CreateTodo = serde_json::from_value(case["input"].clone()).unwrap();
        assert_request(name, &c.build_create_todo(&input).unwrap(), &case["expected_request"]);

        let result = c.parse_create_todo(simulated_response(&case));
        if case.get("expected_error").is_some() {
            assert_error(name, result.unwrap_err(), &case);
        } else {
            let expected: Todo = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

#[test]
fn list_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();
        assert_request(name, &c.build_list_todos(), &case["expected_request"]);

        let todos = c.parse_list_todos(simulated_response(&case)).unwrap();
        let expected: Vec<Todo> = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(todos, expected, "{name}: parsed result");
    }
}

#[test]
fn update_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let id: Uuid = case["input_id"].as_str().unwrap().parse().unwrap();
        let input: UpdateTodo = serde_json::from_value(case["input"].clone()).unwrap();
        assert_request(
            name,
            &c.build_update_todo(id, &input).unwrap(),
            &case["expected_request"],
        );

        let result = c.parse_update_todo(simulated_response(&case));
        if case.get("expected_error").is_some() {
            assert_error(name, result.unwrap_err(), &case);
        } else {
            let expected: Todo = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

#[test]
fn delete_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let id: Uuid = case["input_id"].as_str().unwrap().parse().unwrap();
        assert_request(name, &c.build_delete_todo(id), &case["expected_request"]);

        let result = c.parse_delete_todo(simulated_response(&case));
        if case.get("expected_error").is_some() {
            assert_error(name, result.unwrap_err(), &case);
        } else {
            assert!(result.is_ok(), "{name}: expected success");
        }
    }
}
