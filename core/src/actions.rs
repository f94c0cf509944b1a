//! Atomic domain actions.
//!
//! Each action is a single unit of work taking fully-validated,
//! already-authorized inputs and returning the resulting entity re-read
//! from the store. No action spans more than one aggregate (one todo, one
//! category, or one junction pair).
//!
//! Partial updates are merged here — the action layer, not the caller,
//! owns the omitted-vs-null distinction carried by
//! [`Patch`](crate::Patch).

use crate::error::Result;
use crate::repository::{CategoryRepository, CategoryUpdate, TodoRepository, TodoUpdate};
use crate::types::{Category, Priority, Todo, UserId};
use crate::validate::{CategoryDraft, CategoryPatch, TodoDraft, TodoPatch};
use chrono::NaiveDate;

/// Persist a new todo scoped to `owner`.
///
/// # Errors
///
/// Propagates repository failures.
pub async fn create_todo<R: TodoRepository>(
    repo: &R,
    owner: UserId,
    draft: TodoDraft,
) -> Result<Todo> {
    tracing::debug!(owner = %owner, title = %draft.title, "creating todo");
    repo.insert_todo(owner, draft).await
}

/// Apply the fields present in `patch` to `todo`, leaving the rest
/// untouched, and return the refreshed entity.
///
/// # Errors
///
/// Propagates repository failures.
pub async fn update_todo<R: TodoRepository>(repo: &R, todo: Todo, patch: TodoPatch) -> Result<Todo> {
    tracing::debug!(todo = %todo.id, "updating todo");
    let update = TodoUpdate {
        title: patch.title.unwrap_or(todo.title),
        description: patch.description.resolve(todo.description),
        completed: patch.completed.unwrap_or(todo.completed),
        priority: patch.priority.resolve(todo.priority),
        due_date: patch.due_date.resolve(todo.due_date),
    };
    repo.update_todo(todo.id, update).await
}

/// Permanently remove `todo`, cascading its junction rows.
///
/// # Errors
///
/// Propagates repository failures.
pub async fn delete_todo<R: TodoRepository>(repo: &R, todo: Todo) -> Result<()> {
    tracing::debug!(todo = %todo.id, "deleting todo");
    repo.delete_todo(todo.id).await
}

/// Focused single-field update of the priority; `None` clears it.
///
/// # Errors
///
/// Propagates repository failures.
pub async fn set_todo_priority<R: TodoRepository>(
    repo: &R,
    todo: Todo,
    priority: Option<Priority>,
) -> Result<Todo> {
    let patch = TodoPatch {
        priority: priority.map_or(crate::Patch::Null, crate::Patch::Value),
        ..TodoPatch::default()
    };
    update_todo(repo, todo, patch).await
}

/// Focused single-field update of the due date; `None` clears it.
///
/// # Errors
///
/// Propagates repository failures.
pub async fn set_todo_due_date<R: TodoRepository>(
    repo: &R,
    todo: Todo,
    due_date: Option<NaiveDate>,
) -> Result<Todo> {
    let patch = TodoPatch {
        due_date: due_date.map_or(crate::Patch::Null, crate::Patch::Value),
        ..TodoPatch::default()
    };
    update_todo(repo, todo, patch).await
}

/// Persist a new category scoped to `owner`.
///
/// # Errors
///
/// Propagates repository failures.
pub async fn create_category<R: CategoryRepository>(
    repo: &R,
    owner: UserId,
    draft: CategoryDraft,
) -> Result<Category> {
    tracing::debug!(owner = %owner, name = %draft.name, "creating category");
    repo.insert_category(owner, draft).await
}

/// Apply the fields present in `patch` to `category` and return the
/// refreshed entity.
///
/// # Errors
///
/// Propagates repository failures.
pub async fn update_category<R: CategoryRepository>(
    repo: &R,
    category: Category,
    patch: CategoryPatch,
) -> Result<Category> {
    tracing::debug!(category = %category.id, "updating category");
    let update = CategoryUpdate {
        name: patch.name.unwrap_or(category.name),
        color: patch.color.unwrap_or(category.color),
    };
    repo.update_category(category.id, update).await
}

/// Permanently remove `category`, cascading its junction rows.
///
/// # Errors
///
/// Propagates repository failures.
pub async fn delete_category<R: CategoryRepository>(repo: &R, category: Category) -> Result<()> {
    tracing::debug!(category = %category.id, "deleting category");
    repo.delete_category(category.id).await
}

/// Link `category` to `todo`. Idempotent: attaching an already-attached
/// pair is a no-op.
///
/// # Errors
///
/// Propagates repository failures.
pub async fn attach_category<R: TodoRepository>(
    repo: &R,
    category: &Category,
    todo: &Todo,
) -> Result<()> {
    tracing::debug!(todo = %todo.id, category = %category.id, "attaching category");
    repo.attach_category(todo.id, category.id).await
}

/// Unlink `category` from `todo`. Idempotent: detaching a non-linked pair
/// is a no-op.
///
/// # Errors
///
/// Propagates repository failures.
pub async fn detach_category<R: TodoRepository>(
    repo: &R,
    category: &Category,
    todo: &Todo,
) -> Result<()> {
    tracing::debug!(todo = %todo.id, category = %category.id, "detaching category");
    repo.detach_category(todo.id, category.id).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::Patch;
    use crate::mocks::MockRepository;
    use crate::validate::{CategoryDraft, TodoDraft};
    use chrono::{Duration, Utc};

    fn draft(title: &str) -> TodoDraft {
        TodoDraft {
            title: title.to_string(),
            description: None,
            completed: false,
            priority: None,
            due_date: None,
        }
    }

    fn category_draft(name: &str) -> CategoryDraft {
        CategoryDraft {
            name: name.to_string(),
            color: "#3B82F6".to_string(),
        }
    }

    #[tokio::test]
    async fn create_persists_defaults() {
        let repo = MockRepository::new();
        let owner = UserId::new();

        let todo = create_todo(&repo, owner, draft("Buy milk")).await.unwrap();

        assert_eq!(todo.user_id, owner);
        assert_eq!(todo.title, "Buy milk");
        assert!(!todo.completed);
        assert_eq!(todo.priority, None);
        assert_eq!(todo.due_date, None);
        assert!(todo.categories.is_empty());
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let repo = MockRepository::new();
        let owner = UserId::new();
        let mut base = draft("Original");
        base.description = Some("keep me".to_string());
        base.priority = Some(Priority::High);
        let todo = create_todo(&repo, owner, base).await.unwrap();

        let patch = TodoPatch {
            title: Some("Renamed".to_string()),
            ..TodoPatch::default()
        };
        let updated = update_todo(&repo, todo, patch).await.unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description.as_deref(), Some("keep me"));
        assert_eq!(updated.priority, Some(Priority::High));
    }

    #[tokio::test]
    async fn update_null_clears_priority() {
        let repo = MockRepository::new();
        let owner = UserId::new();
        let mut base = draft("t");
        base.priority = Some(Priority::High);
        let todo = create_todo(&repo, owner, base).await.unwrap();

        let patch = TodoPatch {
            priority: Patch::Null,
            ..TodoPatch::default()
        };
        let updated = update_todo(&repo, todo, patch).await.unwrap();

        assert_eq!(updated.priority, None);
    }

    #[tokio::test]
    async fn update_accepts_past_due_date() {
        let repo = MockRepository::new();
        let owner = UserId::new();
        let todo = create_todo(&repo, owner, draft("t")).await.unwrap();
        let yesterday = Utc::now().date_naive() - Duration::days(1);

        let patch = TodoPatch {
            due_date: Patch::Value(yesterday),
            ..TodoPatch::default()
        };
        let updated = update_todo(&repo, todo, patch).await.unwrap();

        assert_eq!(updated.due_date, Some(yesterday));
    }

    #[tokio::test]
    async fn set_priority_clears_with_none() {
        let repo = MockRepository::new();
        let owner = UserId::new();
        let mut base = draft("t");
        base.priority = Some(Priority::Medium);
        let todo = create_todo(&repo, owner, base).await.unwrap();

        let updated = set_todo_priority(&repo, todo.clone(), None).await.unwrap();
        assert_eq!(updated.priority, None);

        let updated = set_todo_priority(&repo, updated, Some(Priority::Low))
            .await
            .unwrap();
        assert_eq!(updated.priority, Some(Priority::Low));
    }

    #[tokio::test]
    async fn set_due_date_round_trips() {
        let repo = MockRepository::new();
        let owner = UserId::new();
        let todo = create_todo(&repo, owner, draft("t")).await.unwrap();
        let date = Utc::now().date_naive() + Duration::days(3);

        let updated = set_todo_due_date(&repo, todo, Some(date)).await.unwrap();
        assert_eq!(updated.due_date, Some(date));

        let updated = set_todo_due_date(&repo, updated, None).await.unwrap();
        assert_eq!(updated.due_date, None);
    }

    #[tokio::test]
    async fn delete_removes_todo() {
        let repo = MockRepository::new();
        let owner = UserId::new();
        let todo = create_todo(&repo, owner, draft("t")).await.unwrap();
        let id = todo.id;

        delete_todo(&repo, todo).await.unwrap();

        assert!(matches!(
            repo.find_todo(id).await,
            Err(crate::Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn attach_is_idempotent() {
        let repo = MockRepository::new();
        let owner = UserId::new();
        let todo = create_todo(&repo, owner, draft("t")).await.unwrap();
        let category = create_category(&repo, owner, category_draft("Work"))
            .await
            .unwrap();

        attach_category(&repo, &category, &todo).await.unwrap();
        attach_category(&repo, &category, &todo).await.unwrap();

        let refreshed = repo.find_todo(todo.id).await.unwrap();
        assert_eq!(refreshed.categories.len(), 1);
        assert_eq!(repo.count_todos(category.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn detach_non_linked_pair_is_noop() {
        let repo = MockRepository::new();
        let owner = UserId::new();
        let todo = create_todo(&repo, owner, draft("t")).await.unwrap();
        let category = create_category(&repo, owner, category_draft("Work"))
            .await
            .unwrap();

        detach_category(&repo, &category, &todo).await.unwrap();

        let refreshed = repo.find_todo(todo.id).await.unwrap();
        assert!(refreshed.categories.is_empty());
    }

    #[tokio::test]
    async fn detach_keeps_other_links() {
        let repo = MockRepository::new();
        let owner = UserId::new();
        let todo = create_todo(&repo, owner, draft("t")).await.unwrap();
        let work = create_category(&repo, owner, category_draft("Work"))
            .await
            .unwrap();
        let home = create_category(&repo, owner, category_draft("Home"))
            .await
            .unwrap();

        attach_category(&repo, &work, &todo).await.unwrap();
        attach_category(&repo, &home, &todo).await.unwrap();
        detach_category(&repo, &work, &todo).await.unwrap();

        let refreshed = repo.find_todo(todo.id).await.unwrap();
        assert_eq!(refreshed.categories.len(), 1);
        assert_eq!(refreshed.categories[0].id, home.id);
    }

    #[tokio::test]
    async fn delete_category_cascades_junction() {
        let repo = MockRepository::new();
        let owner = UserId::new();
        let todo = create_todo(&repo, owner, draft("t")).await.unwrap();
        let category = create_category(&repo, owner, category_draft("Work"))
            .await
            .unwrap();
        attach_category(&repo, &category, &todo).await.unwrap();

        delete_category(&repo, category).await.unwrap();

        let refreshed = repo.find_todo(todo.id).await.unwrap();
        assert!(refreshed.categories.is_empty());
    }

    #[tokio::test]
    async fn update_category_merges_fields() {
        let repo = MockRepository::new();
        let owner = UserId::new();
        let category = create_category(&repo, owner, category_draft("Work"))
            .await
            .unwrap();

        let patch = CategoryPatch {
            name: Some("Office".to_string()),
            color: None,
        };
        let updated = update_category(&repo, category, patch).await.unwrap();

        assert_eq!(updated.name, "Office");
        assert_eq!(updated.color, "#3B82F6");
    }
}
