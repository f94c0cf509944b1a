//! PostgreSQL repository implementation for the Tasklist service.
//!
//! Implements the `tasklist-core` repository traits over a `PgPool` with
//! runtime-bound queries and embedded migrations. Filtering and sorting
//! are translated to SQL from the same [`TodoFilter`] rules the in-memory
//! repository evaluates in process; sort columns come from a fixed
//! whitelist, so caller input never reaches the query text.
//!
//! # Example
//!
//! ```ignore
//! use tasklist_postgres::PostgresRepository;
//!
//! let repo = PostgresRepository::connect("postgres://localhost/tasklist").await?;
//! repo.migrate().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Days, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use std::future::Future;
use tasklist_core::query::{SortField, SortOrder, StatusFilter, DUE_SOON_DAYS};
use tasklist_core::repository::{CategoryUpdate, TodoUpdate};
use tasklist_core::validate::{CategoryDraft, TodoDraft};
use tasklist_core::{
    Category, CategoryId, CategoryRepository, Error, Priority, Todo, TodoFilter, TodoId,
    TodoRepository, UserId,
};
use uuid::Uuid;

type Result<T> = std::result::Result<T, Error>;

const TODO_COLUMNS: &str =
    "id, user_id, title, description, completed, priority, due_date, created_at, updated_at";

/// PostgreSQL-backed repository for todos and categories.
///
/// Cloning is cheap; the connection pool is shared.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresRepository {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and build a pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| Error::Database(format!("Failed to connect: {e}")))?;
        tracing::debug!("database pool ready");
        Ok(Self::new(pool))
    }

    /// Run embedded database migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        tracing::debug!("running migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Load category associations for the given todos, keyed by todo id.
    async fn load_categories(
        &self,
        todo_ids: &[Uuid],
    ) -> Result<HashMap<TodoId, Vec<Category>>> {
        if todo_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<LinkRow> = sqlx::query_as(
            "SELECT ct.todo_id, c.id, c.user_id, c.name, c.color, c.created_at, c.updated_at \
             FROM category_todo ct \
             JOIN categories c ON c.id = ct.category_id \
             WHERE ct.todo_id = ANY($1) \
             ORDER BY c.name",
        )
        .bind(todo_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to load categories: {e}")))?;

        let mut by_todo: HashMap<TodoId, Vec<Category>> = HashMap::new();
        for row in rows {
            let todo_id = TodoId(row.todo_id);
            by_todo.entry(todo_id).or_default().push(row.into_category());
        }
        Ok(by_todo)
    }

    /// Hydrate one todo row with its associations.
    async fn hydrate(&self, row: TodoRow) -> Result<Todo> {
        let mut by_todo = self.load_categories(&[row.id]).await?;
        let categories = by_todo.remove(&TodoId(row.id)).unwrap_or_default();
        row.into_todo(categories)
    }
}

#[derive(Debug, FromRow)]
struct TodoRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    completed: bool,
    priority: Option<String>,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TodoRow {
    fn into_todo(self, categories: Vec<Category>) -> Result<Todo> {
        let priority = self
            .priority
            .map(|raw| {
                Priority::parse(&raw)
                    .ok_or_else(|| Error::Database(format!("Invalid stored priority: {raw}")))
            })
            .transpose()?;

        Ok(Todo {
            id: TodoId(self.id),
            user_id: UserId(self.user_id),
            title: self.title,
            description: self.description,
            completed: self.completed,
            priority,
            due_date: self.due_date,
            categories,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            id: CategoryId(self.id),
            user_id: UserId(self.user_id),
            name: self.name,
            color: self.color.trim_end().to_string(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct LinkRow {
    todo_id: Uuid,
    id: Uuid,
    user_id: Uuid,
    name: String,
    color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LinkRow {
    fn into_category(self) -> Category {
        Category {
            id: CategoryId(self.id),
            user_id: UserId(self.user_id),
            name: self.name,
            color: self.color.trim_end().to_string(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CategoryCountRow {
    #[sqlx(flatten)]
    category: CategoryRow,
    todos_count: i64,
}

/// Append the ORDER BY clause for `filter`. Column fragments are static
/// strings from the sort whitelist.
fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, filter: &TodoFilter) {
    let direction = match filter.sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };

    builder.push(" ORDER BY ");
    match filter.sort_by {
        SortField::CreatedAt => {
            builder.push("created_at ");
            builder.push(direction);
        }
        SortField::Title => {
            builder.push("title ");
            builder.push(direction);
        }
        SortField::DueDate => {
            builder.push("due_date ");
            builder.push(direction);
            builder.push(" NULLS LAST");
        }
        SortField::Priority => {
            builder.push(
                "CASE priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 WHEN 'high' THEN 2 END ",
            );
            builder.push(direction);
            builder.push(" NULLS LAST");
        }
    }
}

impl TodoRepository for PostgresRepository {
    fn list_todos(
        &self,
        owner: UserId,
        filter: &TodoFilter,
    ) -> impl Future<Output = Result<Vec<Todo>>> + Send {
        let filter = *filter;

        async move {
            let today = Utc::now().date_naive();
            let mut builder = QueryBuilder::<Postgres>::new(format!(
                "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = "
            ));
            builder.push_bind(owner.0);

            match filter.status {
                None => {}
                Some(StatusFilter::Overdue) => {
                    builder.push(" AND due_date < ");
                    builder.push_bind(today);
                    builder.push(" AND completed = FALSE");
                }
                Some(StatusFilter::DueToday) => {
                    builder.push(" AND due_date = ");
                    builder.push_bind(today);
                    builder.push(" AND completed = FALSE");
                }
                Some(StatusFilter::DueSoon) => {
                    let horizon = today + Days::new(DUE_SOON_DAYS);
                    builder.push(" AND due_date >= ");
                    builder.push_bind(today);
                    builder.push(" AND due_date <= ");
                    builder.push_bind(horizon);
                    builder.push(" AND completed = FALSE");
                }
            }

            if let Some(priority) = filter.priority {
                builder.push(" AND priority = ");
                builder.push_bind(priority.as_str());
            }

            push_order_by(&mut builder, &filter);

            let rows: Vec<TodoRow> = builder
                .build_query_as()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to list todos: {e}")))?;

            let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
            let mut by_todo = self.load_categories(&ids).await?;

            rows.into_iter()
                .map(|row| {
                    let categories = by_todo.remove(&TodoId(row.id)).unwrap_or_default();
                    row.into_todo(categories)
                })
                .collect()
        }
    }

    fn find_todo(&self, id: TodoId) -> impl Future<Output = Result<Todo>> + Send {
        async move {
            let row: Option<TodoRow> =
                sqlx::query_as(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"))
                    .bind(id.0)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| Error::Database(format!("Failed to find todo: {e}")))?;

            let row = row.ok_or(Error::NotFound { resource: "Todo" })?;
            self.hydrate(row).await
        }
    }

    fn insert_todo(
        &self,
        owner: UserId,
        draft: TodoDraft,
    ) -> impl Future<Output = Result<Todo>> + Send {
        async move {
            let row: TodoRow = sqlx::query_as(&format!(
                "INSERT INTO todos (user_id, title, description, completed, priority, due_date) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING {TODO_COLUMNS}"
            ))
            .bind(owner.0)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.completed)
            .bind(draft.priority.map(Priority::as_str))
            .bind(draft.due_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to insert todo: {e}")))?;

            row.into_todo(Vec::new())
        }
    }

    fn update_todo(
        &self,
        id: TodoId,
        update: TodoUpdate,
    ) -> impl Future<Output = Result<Todo>> + Send {
        async move {
            let row: Option<TodoRow> = sqlx::query_as(&format!(
                "UPDATE todos \
                 SET title = $2, description = $3, completed = $4, priority = $5, \
                     due_date = $6, updated_at = now() \
                 WHERE id = $1 \
                 RETURNING {TODO_COLUMNS}"
            ))
            .bind(id.0)
            .bind(&update.title)
            .bind(&update.description)
            .bind(update.completed)
            .bind(update.priority.map(Priority::as_str))
            .bind(update.due_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to update todo: {e}")))?;

            let row = row.ok_or(Error::NotFound { resource: "Todo" })?;
            self.hydrate(row).await
        }
    }

    fn delete_todo(&self, id: TodoId) -> impl Future<Output = Result<()>> + Send {
        async move {
            // Junction rows go with the FK cascade.
            sqlx::query("DELETE FROM todos WHERE id = $1")
                .bind(id.0)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to delete todo: {e}")))?;
            Ok(())
        }
    }

    fn attach_category(
        &self,
        todo: TodoId,
        category: CategoryId,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            // The composite primary key is the idempotency guard; a
            // concurrent duplicate attach lands on DO NOTHING instead of
            // surfacing a uniqueness violation.
            sqlx::query(
                "INSERT INTO category_todo (todo_id, category_id) VALUES ($1, $2) \
                 ON CONFLICT (todo_id, category_id) DO NOTHING",
            )
            .bind(todo.0)
            .bind(category.0)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to attach category: {e}")))?;
            Ok(())
        }
    }

    fn detach_category(
        &self,
        todo: TodoId,
        category: CategoryId,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            sqlx::query("DELETE FROM category_todo WHERE todo_id = $1 AND category_id = $2")
                .bind(todo.0)
                .bind(category.0)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to detach category: {e}")))?;
            Ok(())
        }
    }
}

impl CategoryRepository for PostgresRepository {
    fn list_categories(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<(Category, i64)>>> + Send {
        async move {
            let rows: Vec<CategoryCountRow> = sqlx::query_as(
                "SELECT c.id, c.user_id, c.name, c.color, c.created_at, c.updated_at, \
                        COUNT(ct.todo_id) AS todos_count \
                 FROM categories c \
                 LEFT JOIN category_todo ct ON ct.category_id = c.id \
                 WHERE c.user_id = $1 \
                 GROUP BY c.id \
                 ORDER BY c.name",
            )
            .bind(owner.0)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to list categories: {e}")))?;

            Ok(rows
                .into_iter()
                .map(|row| (row.category.into_category(), row.todos_count))
                .collect())
        }
    }

    fn find_category(&self, id: CategoryId) -> impl Future<Output = Result<Category>> + Send {
        async move {
            let row: Option<CategoryRow> = sqlx::query_as(
                "SELECT id, user_id, name, color, created_at, updated_at \
                 FROM categories WHERE id = $1",
            )
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to find category: {e}")))?;

            row.map(CategoryRow::into_category).ok_or(Error::NotFound {
                resource: "Category",
            })
        }
    }

    fn count_todos(&self, id: CategoryId) -> impl Future<Output = Result<i64>> + Send {
        async move {
            let (count,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM category_todo WHERE category_id = $1")
                    .bind(id.0)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| Error::Database(format!("Failed to count todos: {e}")))?;
            Ok(count)
        }
    }

    fn insert_category(
        &self,
        owner: UserId,
        draft: CategoryDraft,
    ) -> impl Future<Output = Result<Category>> + Send {
        async move {
            let row: CategoryRow = sqlx::query_as(
                "INSERT INTO categories (user_id, name, color) VALUES ($1, $2, $3) \
                 RETURNING id, user_id, name, color, created_at, updated_at",
            )
            .bind(owner.0)
            .bind(&draft.name)
            .bind(&draft.color)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to insert category: {e}")))?;

            Ok(row.into_category())
        }
    }

    fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> impl Future<Output = Result<Category>> + Send {
        async move {
            let row: Option<CategoryRow> = sqlx::query_as(
                "UPDATE categories SET name = $2, color = $3, updated_at = now() \
                 WHERE id = $1 \
                 RETURNING id, user_id, name, color, created_at, updated_at",
            )
            .bind(id.0)
            .bind(&update.name)
            .bind(&update.color)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to update category: {e}")))?;

            row.map(CategoryRow::into_category).ok_or(Error::NotFound {
                resource: "Category",
            })
        }
    }

    fn delete_category(&self, id: CategoryId) -> impl Future<Output = Result<()>> + Send {
        async move {
            sqlx::query("DELETE FROM categories WHERE id = $1")
                .bind(id.0)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to delete category: {e}")))?;
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn order_by_uses_whitelisted_columns_only() {
        let cases = [
            (Some("created_at"), None, "ORDER BY created_at DESC"),
            (Some("title"), Some("asc"), "ORDER BY title ASC"),
            (
                Some("due_date"),
                Some("asc"),
                "ORDER BY due_date ASC NULLS LAST",
            ),
            (
                Some("priority"),
                Some("desc"),
                "ORDER BY CASE priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 WHEN 'high' THEN 2 END DESC NULLS LAST",
            ),
            // Arbitrary input falls back to the default column.
            (Some("user_id; DROP TABLE todos"), None, "ORDER BY created_at DESC"),
        ];

        for (sort_by, sort_order, expected) in cases {
            let filter = TodoFilter::from_params(None, None, sort_by, sort_order);
            let mut builder = QueryBuilder::<Postgres>::new("SELECT 1");
            push_order_by(&mut builder, &filter);
            assert!(
                builder.sql().contains(expected),
                "{sort_by:?}/{sort_order:?}: got {}",
                builder.sql()
            );
        }
    }
}
