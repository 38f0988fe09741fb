//! In-memory stand-in for the todo REST backend.
//!
//! Serves the todo and category endpoints with the same list semantics as
//! the real service: lenient paging, search, filters, sorting and the
//! `{data, pagination}` envelope. State lives only as long as the router.

use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub mod db;
pub mod error;
pub mod handlers;
pub mod models;

pub use db::Db;
pub use error::AppError;
pub use models::{Category, Pagination, Priority, Todo, TodoPage};

pub type SharedDb = Arc<RwLock<Db>>;

/// API routes mounted at the root, each call with a fresh, empty store.
pub fn app() -> Router {
    use handlers::{categories, todos};

    let db: SharedDb = Arc::new(RwLock::new(Db::default()));
    Router::new()
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/{id}",
            get(todos::get_todo)
                .put(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .route("/todos/{id}/complete", patch(todos::toggle_complete))
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .with_state(db)
}

/// The API under `/api` plus a root `/health` probe, as the real service
/// lays it out.
pub fn router() -> Router {
    Router::new()
        .nest("/api", app())
        .route("/health", get(health))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock server listening");
    }
    axum::serve(listener, router()).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Server is running" }))
}
