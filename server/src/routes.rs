//! `/todo` handlers.
//!
//! Each handler decodes its input with an axum extractor, so malformed
//! bodies are rejected before the store is touched, then makes exactly one
//! store call.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use todo_core::{CompleteTodo, NewTodo, Todo, TodoCreated, TodoStore};

use crate::auth::Subject;
use crate::error::ApiError;

pub type Store = Arc<TodoStore>;

/// Routes for the four store operations, without auth or fallback.
pub fn todo_routes(store: Store) -> Router {
    Router::new()
        .route("/todo", get(list_todos).post(add_todo).put(complete_todo))
        .route("/todo/{id}", delete(delete_todo))
        .with_state(store)
}

async fn list_todos(State(store): State<Store>) -> Json<Vec<Todo>> {
    Json(store.list())
}

async fn add_todo(
    State(store): State<Store>,
    subject: Subject,
    Json(input): Json<NewTodo>,
) -> (StatusCode, Json<TodoCreated>) {
    let id = store.add(input.message);
    tracing::info!(id = %id, sub = subject.as_str(), "todo added");
    (StatusCode::CREATED, Json(TodoCreated { id }))
}

async fn delete_todo(
    State(store): State<Store>,
    subject: Subject,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    store.delete(&id).inspect_err(|e| tracing::debug!(error = %e, "delete failed"))?;
    tracing::info!(id = %id, sub = subject.as_str(), "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn complete_todo(
    State(store): State<Store>,
    subject: Subject,
    Json(input): Json<CompleteTodo>,
) -> Result<StatusCode, ApiError> {
    store
        .complete(&input.id)
        .inspect_err(|e| tracing::debug!(error = %e, "complete failed"))?;
    tracing::info!(id = %input.id, sub = subject.as_str(), "todo completed");
    Ok(StatusCode::NO_CONTENT)
}
