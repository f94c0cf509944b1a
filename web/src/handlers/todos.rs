//! Todo endpoints.

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::resources::{Envelope, TodoResource};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use tasklist_core::policy::{self, Ability};
use tasklist_core::validate::{
    TodoCreateRequest, TodoUpdateRequest, validate_todo_create, validate_todo_update,
};
use tasklist_core::{TodoFilter, TodoId, TodoRepository, actions};
use uuid::Uuid;

/// Query parameters accepted by `GET /todos`.
#[derive(Debug, Default, Deserialize)]
pub struct ListTodosQuery {
    /// Exact priority match (`high` / `medium` / `low`).
    pub priority: Option<String>,
    /// Derived-status scope (`overdue` / `due_today` / `due_soon`).
    pub status: Option<String>,
    /// Sort column (whitelisted; default `created_at`).
    pub sort_by: Option<String>,
    /// Sort direction (`asc` / `desc`; default `desc`).
    pub sort_order: Option<String>,
}

/// `GET /todos` — list the caller's todos, filtered and sorted.
///
/// # Errors
///
/// Returns 401 without a principal, 500 on persistence failure.
pub async fn list_todos<R>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ListTodosQuery>,
) -> Result<Json<Envelope<Vec<TodoResource>>>, AppError>
where
    R: TodoRepository + Clone + Send + Sync + 'static,
{
    let filter = TodoFilter::from_params(
        params.priority.as_deref(),
        params.status.as_deref(),
        params.sort_by.as_deref(),
        params.sort_order.as_deref(),
    );

    let todos = state.repo.list_todos(user, &filter).await?;

    let today = Utc::now().date_naive();
    let resources = todos
        .iter()
        .map(|todo| TodoResource::from_todo(todo, today))
        .collect();
    Ok(Json(Envelope::new(resources)))
}

/// `POST /todos` — create a todo owned by the caller.
///
/// # Errors
///
/// Returns 422 on validation failure, 401 without a principal.
pub async fn create_todo<R>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<TodoCreateRequest>,
) -> Result<(StatusCode, Json<Envelope<TodoResource>>), AppError>
where
    R: TodoRepository + Clone + Send + Sync + 'static,
{
    let today = Utc::now().date_naive();
    let draft = validate_todo_create(body, today)?;

    let todo = actions::create_todo(&state.repo, user, draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(TodoResource::from_todo(&todo, today))),
    ))
}

/// `GET /todos/:id` — show one todo.
///
/// # Errors
///
/// Returns 404 for unknown ids, 403 for another owner's todo.
pub async fn show_todo<R>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<TodoResource>>, AppError>
where
    R: TodoRepository + Clone + Send + Sync + 'static,
{
    let todo = state.repo.find_todo(TodoId(id)).await?;
    policy::authorize(user, &todo, Ability::View)?;

    let today = Utc::now().date_naive();
    Ok(Json(Envelope::new(TodoResource::from_todo(&todo, today))))
}

/// `PUT /todos/:id` — partial update; omitted fields stay untouched,
/// explicit nulls clear nullable fields.
///
/// # Errors
///
/// Returns 422 on validation failure, 404/403 per ownership.
pub async fn update_todo<R>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<TodoUpdateRequest>,
) -> Result<Json<Envelope<TodoResource>>, AppError>
where
    R: TodoRepository + Clone + Send + Sync + 'static,
{
    let patch = validate_todo_update(body)?;

    let todo = state.repo.find_todo(TodoId(id)).await?;
    policy::authorize(user, &todo, Ability::Update)?;

    let todo = actions::update_todo(&state.repo, todo, patch).await?;

    let today = Utc::now().date_naive();
    Ok(Json(Envelope::new(TodoResource::from_todo(&todo, today))))
}

/// `DELETE /todos/:id` — hard delete, cascading junction rows.
///
/// # Errors
///
/// Returns 404/403 per ownership.
pub async fn delete_todo<R>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    R: TodoRepository + Clone + Send + Sync + 'static,
{
    let todo = state.repo.find_todo(TodoId(id)).await?;
    policy::authorize(user, &todo, Ability::Delete)?;

    actions::delete_todo(&state.repo, todo).await?;

    Ok(StatusCode::NO_CONTENT)
}
