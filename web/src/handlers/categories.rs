//! Category endpoints, including the todo–category junction.

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::resources::{CategoryResource, Envelope, TodoResource};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use tasklist_core::policy::{self, Ability};
use tasklist_core::validate::{
    CategoryCreateRequest, CategoryUpdateRequest, validate_category_create,
    validate_category_update,
};
use tasklist_core::{CategoryId, CategoryRepository, TodoId, TodoRepository, actions};
use uuid::Uuid;

/// `GET /categories` — list the caller's categories, name-ordered, each
/// with its todo count.
///
/// # Errors
///
/// Returns 401 without a principal, 500 on persistence failure.
pub async fn list_categories<R>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Envelope<Vec<CategoryResource>>>, AppError>
where
    R: CategoryRepository + Clone + Send + Sync + 'static,
{
    let categories = state.repo.list_categories(user).await?;

    let resources = categories
        .iter()
        .map(|(category, count)| CategoryResource::with_count(category, *count))
        .collect();
    Ok(Json(Envelope::new(resources)))
}

/// `POST /categories` — create a category owned by the caller.
///
/// # Errors
///
/// Returns 422 on validation failure.
pub async fn create_category<R>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CategoryCreateRequest>,
) -> Result<(StatusCode, Json<Envelope<CategoryResource>>), AppError>
where
    R: CategoryRepository + Clone + Send + Sync + 'static,
{
    let draft = validate_category_create(body)?;

    let category = actions::create_category(&state.repo, user, draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(CategoryResource::from_category(&category))),
    ))
}

/// `GET /categories/:id` — show one category with its todo count.
///
/// # Errors
///
/// Returns 404 for unknown ids, 403 for another owner's category.
pub async fn show_category<R>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<CategoryResource>>, AppError>
where
    R: CategoryRepository + Clone + Send + Sync + 'static,
{
    let category = state.repo.find_category(CategoryId(id)).await?;
    policy::authorize(user, &category, Ability::View)?;

    let count = state.repo.count_todos(category.id).await?;
    Ok(Json(Envelope::new(CategoryResource::with_count(
        &category, count,
    ))))
}

/// `PUT /categories/:id` — partial update.
///
/// # Errors
///
/// Returns 422 on validation failure, 404/403 per ownership.
pub async fn update_category<R>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CategoryUpdateRequest>,
) -> Result<Json<Envelope<CategoryResource>>, AppError>
where
    R: CategoryRepository + Clone + Send + Sync + 'static,
{
    let patch = validate_category_update(body)?;

    let category = state.repo.find_category(CategoryId(id)).await?;
    policy::authorize(user, &category, Ability::Update)?;

    let category = actions::update_category(&state.repo, category, patch).await?;

    Ok(Json(Envelope::new(CategoryResource::from_category(
        &category,
    ))))
}

/// `DELETE /categories/:id` — hard delete, cascading junction rows.
///
/// # Errors
///
/// Returns 404/403 per ownership.
pub async fn delete_category<R>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    R: CategoryRepository + Clone + Send + Sync + 'static,
{
    let category = state.repo.find_category(CategoryId(id)).await?;
    policy::authorize(user, &category, Ability::Delete)?;

    actions::delete_category(&state.repo, category).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /todos/:id/categories/:category_id` — idempotent attach.
///
/// Requires `Update` on the todo and `View` on the category, so another
/// owner's category can never be linked.
///
/// # Errors
///
/// Returns 404/403 per ownership of either resource.
pub async fn attach_category<R>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path((todo_id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Envelope<TodoResource>>, AppError>
where
    R: TodoRepository + CategoryRepository + Clone + Send + Sync + 'static,
{
    let todo = state.repo.find_todo(TodoId(todo_id)).await?;
    policy::authorize(user, &todo, Ability::Update)?;

    let category = state.repo.find_category(CategoryId(category_id)).await?;
    policy::authorize(user, &category, Ability::View)?;

    actions::attach_category(&state.repo, &category, &todo).await?;

    let todo = state.repo.find_todo(todo.id).await?;
    let today = Utc::now().date_naive();
    Ok(Json(Envelope::new(TodoResource::from_todo(&todo, today))))
}

/// `DELETE /todos/:id/categories/:category_id` — idempotent detach.
///
/// # Errors
///
/// Returns 404/403 per ownership of the todo.
pub async fn detach_category<R>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path((todo_id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Envelope<TodoResource>>, AppError>
where
    R: TodoRepository + CategoryRepository + Clone + Send + Sync + 'static,
{
    let todo = state.repo.find_todo(TodoId(todo_id)).await?;
    policy::authorize(user, &todo, Ability::Update)?;

    let category = state.repo.find_category(CategoryId(category_id)).await?;

    actions::detach_category(&state.repo, &category, &todo).await?;

    let todo = state.repo.find_todo(todo.id).await?;
    let today = Utc::now().date_naive();
    Ok(Json(Envelope::new(TodoResource::from_todo(&todo, today))))
}
