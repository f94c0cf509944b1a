//! In-memory repository for testing.
//!
//! Backs the action unit tests and the HTTP-level tests so they run at
//! memory speed with no database. Semantics mirror the PostgreSQL
//! implementation, including idempotent junction handling and
//! nulls-last sorting (both stores evaluate the same
//! [`TodoFilter`](crate::TodoFilter) rules).

use crate::error::{Error, Result};
use crate::query::TodoFilter;
use crate::repository::{
    CategoryRepository, CategoryUpdate, TodoRepository, TodoUpdate,
};
use crate::types::{Category, CategoryId, Todo, TodoId, UserId};
use crate::validate::{CategoryDraft, TodoDraft};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Store {
    todos: HashMap<TodoId, Todo>,
    categories: HashMap<CategoryId, Category>,
    links: HashSet<(TodoId, CategoryId)>,
}

/// In-memory implementation of both repository traits.
///
/// Cloning shares the underlying store, matching the pool-backed
/// PostgreSQL repository.
#[derive(Debug, Clone, Default)]
pub struct MockRepository {
    store: Arc<Mutex<Store>>,
}

impl MockRepository {
    /// Create an empty mock repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| Error::Database("mock store poisoned".to_string()))
    }
}

impl Store {
    /// Rehydrate a todo with its category associations, name-ordered for
    /// deterministic output.
    fn hydrate(&self, todo: &Todo) -> Todo {
        let mut categories: Vec<Category> = self
            .links
            .iter()
            .filter(|(todo_id, _)| *todo_id == todo.id)
            .filter_map(|(_, category_id)| self.categories.get(category_id).cloned())
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));

        Todo {
            categories,
            ..todo.clone()
        }
    }
}

impl TodoRepository for MockRepository {
    fn list_todos(
        &self,
        owner: UserId,
        filter: &TodoFilter,
    ) -> impl Future<Output = Result<Vec<Todo>>> + Send {
        let filter = *filter;

        async move {
            let store = self.lock()?;
            let today = Utc::now().date_naive();

            let mut todos: Vec<Todo> = store
                .todos
                .values()
                .filter(|todo| todo.user_id == owner)
                .filter(|todo| filter.matches(todo, today))
                .map(|todo| store.hydrate(todo))
                .collect();

            // Canonical base order so the stable sort is deterministic.
            todos.sort_by(|a, b| (a.created_at, a.id.0).cmp(&(b.created_at, b.id.0)));
            filter.sort(&mut todos);
            Ok(todos)
        }
    }

    fn find_todo(&self, id: TodoId) -> impl Future<Output = Result<Todo>> + Send {
        async move {
            let store = self.lock()?;
            store
                .todos
                .get(&id)
                .map(|todo| store.hydrate(todo))
                .ok_or(Error::NotFound { resource: "Todo" })
        }
    }

    fn insert_todo(
        &self,
        owner: UserId,
        draft: TodoDraft,
    ) -> impl Future<Output = Result<Todo>> + Send {
        async move {
            let now = Utc::now();
            let todo = Todo {
                id: TodoId::new(),
                user_id: owner,
                title: draft.title,
                description: draft.description,
                completed: draft.completed,
                priority: draft.priority,
                due_date: draft.due_date,
                categories: Vec::new(),
                created_at: now,
                updated_at: now,
            };

            self.lock()?.todos.insert(todo.id, todo.clone());
            Ok(todo)
        }
    }

    fn update_todo(
        &self,
        id: TodoId,
        update: TodoUpdate,
    ) -> impl Future<Output = Result<Todo>> + Send {
        async move {
            let mut store = self.lock()?;
            let todo = store
                .todos
                .get_mut(&id)
                .ok_or(Error::NotFound { resource: "Todo" })?;

            todo.title = update.title;
            todo.description = update.description;
            todo.completed = update.completed;
            todo.priority = update.priority;
            todo.due_date = update.due_date;
            todo.updated_at = Utc::now();

            let refreshed = todo.clone();
            Ok(store.hydrate(&refreshed))
        }
    }

    fn delete_todo(&self, id: TodoId) -> impl Future<Output = Result<()>> + Send {
        async move {
            let mut store = self.lock()?;
            store.todos.remove(&id);
            store.links.retain(|(todo_id, _)| *todo_id != id);
            Ok(())
        }
    }

    fn attach_category(
        &self,
        todo: TodoId,
        category: CategoryId,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            // HashSet insert is already idempotent, like ON CONFLICT DO
            // NOTHING on the composite key.
            self.lock()?.links.insert((todo, category));
            Ok(())
        }
    }

    fn detach_category(
        &self,
        todo: TodoId,
        category: CategoryId,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.lock()?.links.remove(&(todo, category));
            Ok(())
        }
    }
}

impl CategoryRepository for MockRepository {
    fn list_categories(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<(Category, i64)>>> + Send {
        async move {
            let store = self.lock()?;
            let mut categories: Vec<(Category, i64)> = store
                .categories
                .values()
                .filter(|category| category.user_id == owner)
                .map(|category| {
                    let count = store
                        .links
                        .iter()
                        .filter(|(_, category_id)| *category_id == category.id)
                        .count() as i64;
                    (category.clone(), count)
                })
                .collect();

            categories.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name));
            Ok(categories)
        }
    }

    fn find_category(&self, id: CategoryId) -> impl Future<Output = Result<Category>> + Send {
        async move {
            self.lock()?
                .categories
                .get(&id)
                .cloned()
                .ok_or(Error::NotFound {
                    resource: "Category",
                })
        }
    }

    fn count_todos(&self, id: CategoryId) -> impl Future<Output = Result<i64>> + Send {
        async move {
            let store = self.lock()?;
            Ok(store
                .links
                .iter()
                .filter(|(_, category_id)| *category_id == id)
                .count() as i64)
        }
    }

    fn insert_category(
        &self,
        owner: UserId,
        draft: CategoryDraft,
    ) -> impl Future<Output = Result<Category>> + Send {
        async move {
            let now = Utc::now();
            let category = Category {
                id: CategoryId::new(),
                user_id: owner,
                name: draft.name,
                color: draft.color,
                created_at: now,
                updated_at: now,
            };

            self.lock()?.categories.insert(category.id, category.clone());
            Ok(category)
        }
    }

    fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> impl Future<Output = Result<Category>> + Send {
        async move {
            let mut store = self.lock()?;
            let category = store.categories.get_mut(&id).ok_or(Error::NotFound {
                resource: "Category",
            })?;

            category.name = update.name;
            category.color = update.color;
            category.updated_at = Utc::now();

            Ok(category.clone())
        }
    }

    fn delete_category(&self, id: CategoryId) -> impl Future<Output = Result<()>> + Send {
        async move {
            let mut store = self.lock()?;
            store.categories.remove(&id);
            store.links.retain(|(_, category_id)| *category_id != id);
            Ok(())
        }
    }
}
