//! Router composition.
//!
//! Composes all handlers into a single Axum router, generic over the
//! repository implementation.

use crate::error::AppError;
use crate::handlers::{categories, health, todos};
use crate::state::AppState;
use axum::{
    Router,
    routing::get,
};
use tasklist_core::{CategoryRepository, TodoRepository};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the API router with all endpoints.
///
/// # Routes
///
/// ## Todos
/// - `GET /todos` - List (filter: `priority`, `status`; sort: `sort_by`, `sort_order`)
/// - `POST /todos` - Create
/// - `GET /todos/:id` - Show
/// - `PUT /todos/:id` - Partial update
/// - `DELETE /todos/:id` - Delete
///
/// ## Junction
/// - `POST /todos/:id/categories/:category_id` - Attach (idempotent)
/// - `DELETE /todos/:id/categories/:category_id` - Detach (idempotent)
///
/// ## Categories
/// - `GET /categories` - List with todo counts
/// - `POST /categories` - Create
/// - `GET /categories/:id` - Show
/// - `PUT /categories/:id` - Partial update
/// - `DELETE /categories/:id` - Delete
///
/// # Example
///
/// ```ignore
/// let repo = PostgresRepository::connect(&config.database_url).await?;
/// let app = api_router(AppState::new(repo));
/// axum::serve(listener, app).await?;
/// ```
pub fn api_router<R>(state: AppState<R>) -> Router
where
    R: TodoRepository + CategoryRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/todos",
            get(todos::list_todos::<R>).post(todos::create_todo::<R>),
        )
        .route(
            "/todos/:id",
            get(todos::show_todo::<R>)
                .put(todos::update_todo::<R>)
                .delete(todos::delete_todo::<R>),
        )
        .route(
            "/todos/:id/categories/:category_id",
            axum::routing::post(categories::attach_category::<R>)
                .delete(categories::detach_category::<R>),
        )
        .route(
            "/categories",
            get(categories::list_categories::<R>).post(categories::create_category::<R>),
        )
        .route(
            "/categories/:id",
            get(categories::show_category::<R>)
                .put(categories::update_category::<R>)
                .delete(categories::delete_category::<R>),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn not_found() -> AppError {
    AppError::not_found("Resource")
}
