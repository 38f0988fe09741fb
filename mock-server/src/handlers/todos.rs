use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::models::{ListParams, Todo, TodoInput, TodoPage};
use crate::SharedDb;

pub async fn list_todos(
    State(db): State<SharedDb>,
    Query(params): Query<ListParams>,
) -> Json<TodoPage> {
    let page = db.read().await.list_todos(&params);
    tracing::debug!(
        total = page.pagination.total,
        returned = page.data.len(),
        "listed todos"
    );
    Json(page)
}

pub async fn create_todo(
    State(db): State<SharedDb>,
    Json(input): Json<TodoInput>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let todo = db.write().await.create_todo(input)?;
    tracing::info!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_todo(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
) -> Result<Json<Todo>, AppError> {
    db.read().await.get_todo(id).map(Json)
}

pub async fn update_todo(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
    Json(input): Json<TodoInput>,
) -> Result<Json<Todo>, AppError> {
    db.write().await.update_todo(id, input).map(Json)
}

pub async fn delete_todo(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    db.write().await.delete_todo(id)?;
    tracing::info!(id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_complete(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
) -> Result<Json<Todo>, AppError> {
    let todo = db.write().await.toggle_complete(id)?;
    tracing::debug!(id, completed = todo.completed, "toggled todo");
    Ok(Json(todo))
}
