//! Repository traits over the relational store.
//!
//! The storage engine itself is an external collaborator; these traits are
//! the only way domain code touches it. Reads that resolve a bare id
//! (`find_*`) return [`Error::NotFound`](crate::Error::NotFound) when the
//! id is unknown — ownership is then checked by the policy layer so a
//! foreign id yields 403 while a missing one yields 404. Everything else
//! is parameterized by owner or takes an already-authorized entity.

use crate::error::Result;
use crate::query::TodoFilter;
use crate::types::{Category, CategoryId, Priority, Todo, TodoId, UserId};
use crate::validate::{CategoryDraft, TodoDraft};
use chrono::NaiveDate;

/// The fully-merged field set applied by a todo update.
///
/// Produced by the update action after merging the validated patch onto
/// the current entity; the store applies it atomically, all or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoUpdate {
    /// New title.
    pub title: String,
    /// New description.
    pub description: Option<String>,
    /// New completion flag.
    pub completed: bool,
    /// New priority.
    pub priority: Option<Priority>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
}

/// The fully-merged field set applied by a category update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryUpdate {
    /// New name.
    pub name: String,
    /// New color.
    pub color: String,
}

/// Storage operations for todos and their category junction.
///
/// Implementations must load category associations eagerly on every todo
/// they return.
pub trait TodoRepository: Send + Sync {
    /// List `owner`'s todos, filtered and sorted per `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_todos(
        &self,
        owner: UserId,
        filter: &TodoFilter,
    ) -> impl Future<Output = Result<Vec<Todo>>> + Send;

    /// Resolve a todo by id.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the id is unknown.
    fn find_todo(&self, id: TodoId) -> impl Future<Output = Result<Todo>> + Send;

    /// Persist a new todo owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    fn insert_todo(
        &self,
        owner: UserId,
        draft: TodoDraft,
    ) -> impl Future<Output = Result<Todo>> + Send;

    /// Apply a merged update and return the refreshed entity.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the id is unknown.
    fn update_todo(
        &self,
        id: TodoId,
        update: TodoUpdate,
    ) -> impl Future<Output = Result<Todo>> + Send;

    /// Permanently remove a todo, cascading its junction rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn delete_todo(&self, id: TodoId) -> impl Future<Output = Result<()>> + Send;

    /// Insert a junction row; a no-op when the pair is already linked.
    ///
    /// Concurrent duplicate attaches are resolved by the store's composite
    /// uniqueness constraint, never surfaced as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails for any other reason.
    fn attach_category(
        &self,
        todo: TodoId,
        category: CategoryId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove a junction row; a no-op when the pair is not linked.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn detach_category(
        &self,
        todo: TodoId,
        category: CategoryId,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Storage operations for categories.
pub trait CategoryRepository: Send + Sync {
    /// List `owner`'s categories ordered by name, each with its todo
    /// count.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_categories(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<(Category, i64)>>> + Send;

    /// Resolve a category by id.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the id is unknown.
    fn find_category(&self, id: CategoryId) -> impl Future<Output = Result<Category>> + Send;

    /// Number of todos the category is attached to.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn count_todos(&self, id: CategoryId) -> impl Future<Output = Result<i64>> + Send;

    /// Persist a new category owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    fn insert_category(
        &self,
        owner: UserId,
        draft: CategoryDraft,
    ) -> impl Future<Output = Result<Category>> + Send;

    /// Apply a merged update and return the refreshed entity.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the id is unknown.
    fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> impl Future<Output = Result<Category>> + Send;

    /// Permanently remove a category, cascading its junction rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn delete_category(&self, id: CategoryId) -> impl Future<Output = Result<()>> + Send;
}
