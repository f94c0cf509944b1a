//! Wire-format projections of the domain entities.
//!
//! Derived fields (`is_overdue`, `is_due_today`, priority label/color) are
//! computed here from stored state and the current date — never persisted,
//! so they can't go stale against the calendar.

use chrono::{NaiveDate, SecondsFormat};
use serde::Serialize;
use tasklist_core::{Category, Todo};

/// Standard `{"data": ...}` response envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// Enveloped payload.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wrap a payload.
    pub const fn new(data: T) -> Self {
        Self { data }
    }
}

/// Wire projection of a [`Todo`].
#[derive(Debug, Serialize)]
pub struct TodoResource {
    /// Identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description, if any.
    pub description: Option<String>,
    /// Completion flag.
    pub completed: bool,
    /// Priority wire value (`high` / `medium` / `low`), if any.
    pub priority: Option<&'static str>,
    /// Priority display label, if any.
    pub priority_label: Option<&'static str>,
    /// Priority display color, if any.
    pub priority_color: Option<&'static str>,
    /// Due date as `YYYY-MM-DD`, if any.
    pub due_date: Option<String>,
    /// Human-readable due date, e.g. `Jan 5, 2026`, if any.
    pub due_date_formatted: Option<String>,
    /// Whether the todo is past due and incomplete.
    pub is_overdue: bool,
    /// Whether the todo is due today and incomplete.
    pub is_due_today: bool,
    /// Attached categories.
    pub categories: Vec<CategoryResource>,
    /// Creation timestamp, ISO-8601.
    pub created_at: String,
    /// Last-update timestamp, ISO-8601.
    pub updated_at: String,
}

impl TodoResource {
    /// Project a todo against `today`.
    #[must_use]
    pub fn from_todo(todo: &Todo, today: NaiveDate) -> Self {
        Self {
            id: todo.id.to_string(),
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: todo.completed,
            priority: todo.priority.map(|p| p.as_str()),
            priority_label: todo.priority.map(|p| p.label()),
            priority_color: todo.priority.map(|p| p.color()),
            due_date: todo.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            due_date_formatted: todo.due_date.map(|d| d.format("%b %-d, %Y").to_string()),
            is_overdue: todo.is_overdue(today),
            is_due_today: todo.is_due_today(today),
            categories: todo
                .categories
                .iter()
                .map(CategoryResource::from_category)
                .collect(),
            created_at: todo.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            updated_at: todo.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// Wire projection of a [`Category`].
#[derive(Debug, Serialize)]
pub struct CategoryResource {
    /// Identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hex color.
    pub color: String,
    /// Number of attached todos; present only when the caller requested
    /// the aggregate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todos_count: Option<i64>,
    /// Creation timestamp, ISO-8601.
    pub created_at: String,
    /// Last-update timestamp, ISO-8601.
    pub updated_at: String,
}

impl CategoryResource {
    /// Project a category without the todo count.
    #[must_use]
    pub fn from_category(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            color: category.color.clone(),
            todos_count: None,
            created_at: category
                .created_at
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            updated_at: category
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    /// Project a category with its todo count.
    #[must_use]
    pub fn with_count(category: &Category, todos_count: i64) -> Self {
        Self {
            todos_count: Some(todos_count),
            ..Self::from_category(category)
        }
    }
}
