//! Custom Axum extractors.
//!
//! Authentication itself is an external collaborator: an upstream gateway
//! authenticates the caller and forwards the principal's identity in the
//! `X-User-Id` header. The [`CurrentUser`] extractor turns that into a
//! typed [`UserId`], rejecting with 401 when the header is absent or
//! malformed.

use crate::error::AppError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tasklist_core::UserId;
use uuid::Uuid;

/// Header carrying the pre-authenticated principal.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// The authenticated principal of the current request.
///
/// # Example
///
/// ```ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> Result<Json<Response>, AppError> {
///     let todos = repo.list_todos(user, &filter).await?;
///     Ok(Json(todos))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .map(|id| Self(UserId(id)))
            .ok_or_else(|| AppError::unauthorized("Unauthenticated."))
    }
}
