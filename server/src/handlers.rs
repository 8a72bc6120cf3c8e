//! Route handlers.
//!
//! Each handler validates its input first, then opens one store session,
//! performs its work and commits. Early returns drop the session, which rolls
//! back and releases the connection.

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::extract::{TodoId, ValidJson};
use crate::models::{Greeting, TodoCreate, TodoRead, TodoUpdate};
use crate::AppState;

pub const GREETING: &str = "Hello from FastAPI";

/// `GET /`
pub async fn health() -> Json<Greeting> {
    Json(Greeting {
        message: GREETING.to_string(),
    })
}

/// `GET /todos`
pub async fn list_todos(State(state): State<AppState>) -> ApiResult<Json<Vec<TodoRead>>> {
    let mut session = state.store.session().await?;
    let todos = session.fetch_all().await?;
    tracing::debug!(count = todos.len(), "listed todos");
    Ok(Json(todos.into_iter().map(TodoRead::from).collect()))
}

/// `POST /todos`
pub async fn create_todo(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<TodoCreate>,
) -> ApiResult<(StatusCode, Json<TodoRead>)> {
    let todo = input.into_todo(Uuid::new_v4());
    let id = todo.id;

    let mut session = state.store.session().await?;
    session.insert(&todo).await?;
    // Re-read so the response reflects what the store actually holds.
    let stored = session.fetch(id).await?.unwrap_or(todo);
    session.commit().await?;

    tracing::info!(todo_id = %id, "created todo");
    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// `PATCH /todos/{id}`
pub async fn update_todo(
    State(state): State<AppState>,
    TodoId(id): TodoId,
    ValidJson(input): ValidJson<TodoUpdate>,
) -> ApiResult<Json<TodoRead>> {
    let changes = input.validate()?;

    let mut session = state.store.session().await?;
    let Some(mut todo) = session.fetch(id).await? else {
        tracing::debug!(todo_id = %id, "update of unknown todo");
        return Err(ApiError::NotFound);
    };
    changes.apply(&mut todo);
    if !session.update(&todo).await? {
        tracing::debug!(todo_id = %id, "todo deleted before update");
        return Err(ApiError::NotFound);
    }
    let Some(stored) = session.fetch(id).await? else {
        return Err(ApiError::NotFound);
    };
    session.commit().await?;

    tracing::info!(todo_id = %id, "updated todo");
    Ok(Json(stored.into()))
}

/// `DELETE /todos/{id}`
pub async fn delete_todo(State(state): State<AppState>, TodoId(id): TodoId) -> ApiResult<StatusCode> {
    let mut session = state.store.session().await?;
    if session.fetch(id).await?.is_none() {
        tracing::debug!(todo_id = %id, "delete of unknown todo");
        return Err(ApiError::NotFound);
    }
    session.delete(id).await?;
    session.commit().await?;

    tracing::info!(todo_id = %id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}
