//! Full CRUD lifecycle test against the live server.
//!
//! # Design
//! Starts the server with an in-memory store on a random port, then exercises
//! every core client operation over real HTTP using ureq. Validates that the
//! core's request building and response parsing work end-to-end with the
//! actual server.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use todo_core::{
    pending_count, ApiError, CreateTodo, HttpMethod, HttpRequest, HttpResponse, TodoClient,
    UpdateTodo,
};
use todo_server::MemoryTodoStore;

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Patch, Some(body)) => agent
            .patch(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Patch, None) => agent.patch(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

fn spawn_server() -> TodoClient {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener, Arc::new(MemoryTodoStore::new())).await
        })
        .unwrap();
    });

    TodoClient::new(&format!("http://{addr}"))
}

#[test]
fn crud_lifecycle() {
    let client = spawn_server();

    // Health check.
    let message = client.parse_health(execute(client.build_health())).unwrap();
    assert_eq!(message, "Hello from FastAPI");

    // List: should be empty.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list");

    // Create with every optional field set.
    let due = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
    let create_input = CreateTodo {
        description: Some("two litres".to_string()),
        due: Some(due),
        priority: Some("high".to_string()),
        ..CreateTodo::named("Integration test")
    };
    let req = client.build_create_todo(&create_input).unwrap();
    let created = client.parse_create_todo(execute(req)).unwrap();
    assert_eq!(created.name, "Integration test");
    assert_eq!(created.description.as_deref(), Some("two litres"));
    assert_eq!(created.due, Some(due));
    assert_eq!(created.priority.as_deref(), Some("high"));
    assert!(!created.done);
    let id = created.id;

    // Rename only.
    let update_input = UpdateTodo {
        name: Some("Updated name".to_string()),
        ..UpdateTodo::default()
    };
    let req = client.build_update_todo(id, &update_input).unwrap();
    let updated = client.parse_update_todo(execute(req)).unwrap();
    assert_eq!(updated.name, "Updated name");
    assert_eq!(updated.priority.as_deref(), Some("high"));
    assert!(!updated.done);

    // Toggle done.
    let req = client.build_toggle_done(&updated).unwrap();
    let toggled = client.parse_toggle_done(execute(req)).unwrap();
    assert!(toggled.done);
    assert_eq!(toggled.name, "Updated name");

    // Clear description with an explicit null.
    let update_input = UpdateTodo {
        description: Some(None),
        ..UpdateTodo::default()
    };
    let req = client.build_update_todo(id, &update_input).unwrap();
    let cleared = client.parse_update_todo(execute(req)).unwrap();
    assert!(cleared.description.is_none());
    assert_eq!(cleared.due, Some(due));

    // Create fails validation on an empty JSON object.
    let req = HttpRequest {
        body: Some("{}".to_string()),
        ..client.build_create_todo(&CreateTodo::named("unused")).unwrap()
    };
    let err = client.parse_create_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::Validation { .. }), "got {err:?}");

    // List: one done item.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0], cleared);
    assert_eq!(pending_count(&todos), 0);

    // Delete.
    client.parse_delete_todo(execute(client.build_delete_todo(id))).unwrap();

    // Update after delete: NotFound.
    let req = client.build_toggle_done(&cleared).unwrap();
    let err = client.parse_toggle_done(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Delete again: NotFound.
    let err = client
        .parse_delete_todo(execute(client.build_delete_todo(id)))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // List: empty again.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list after delete");
}
