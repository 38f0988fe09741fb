use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::models::{Category, CategoryInput};
use crate::SharedDb;

pub async fn list_categories(State(db): State<SharedDb>) -> Json<Vec<Category>> {
    Json(db.read().await.list_categories())
}

pub async fn create_category(
    State(db): State<SharedDb>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = db.write().await.create_category(input)?;
    tracing::info!(id = category.id, name = %category.name, "created category");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_category(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
) -> Result<Json<Category>, AppError> {
    db.read().await.get_category(id).map(Json)
}

pub async fn update_category(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>, AppError> {
    db.write().await.update_category(id, input).map(Json)
}

pub async fn delete_category(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    db.write().await.delete_category(id)?;
    tracing::info!(id, "deleted category");
    Ok(StatusCode::NO_CONTENT)
}
