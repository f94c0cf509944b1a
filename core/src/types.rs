//! Domain entities and value types.
//!
//! All types are `Clone` and `Serialize`/`Deserialize` so they can flow
//! between the repository implementations and the web shell without
//! copying logic into either.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a user (the owning principal).
///
/// Users themselves are an external collaborator; only their identity
/// crosses into this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TodoId(pub Uuid);

impl TodoId {
    /// Generate a new random `TodoId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub Uuid);

impl CategoryId {
    /// Generate a new random `CategoryId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Priority
// ═══════════════════════════════════════════════════════════════════════

/// Todo priority level.
///
/// A closed value type, not a persisted entity. Ordered by urgency
/// (`Low < Medium < High`) so sorting by priority is by rank rather than
/// by the stored string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Lowest urgency.
    Low,
    /// Default middle urgency.
    Medium,
    /// Highest urgency.
    High,
}

impl Priority {
    /// Human-readable display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Fixed display color.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::High => "#EF4444",   // Red
            Self::Medium => "#F59E0B", // Orange
            Self::Low => "#10B981",    // Green
        }
    }

    /// Wire value (`high` / `medium` / `low`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parse a wire value, `None` for anything outside the closed set.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Entities
// ═══════════════════════════════════════════════════════════════════════

/// Default color assigned to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// A user-owned label attachable to todos (many-to-many).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Store-generated identifier.
    pub id: CategoryId,
    /// Owning user; immutable after creation.
    pub user_id: UserId,
    /// Display name, at most 50 characters.
    pub name: String,
    /// 6-digit hex color (`#RRGGBB`).
    pub color: String,
    /// Store-managed creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Store-managed last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A single task owned by one user.
///
/// Category associations are always carried on the entity; repositories
/// load them eagerly so the projection layer never fetches per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Store-generated identifier.
    pub id: TodoId,
    /// Owning user; immutable after creation.
    pub user_id: UserId,
    /// Required title, at most 255 characters.
    pub title: String,
    /// Optional free-form description, no length cap.
    pub description: Option<String>,
    /// Completion flag, defaults to `false`.
    pub completed: bool,
    /// Optional priority level.
    pub priority: Option<Priority>,
    /// Optional due date (calendar date, no time component).
    pub due_date: Option<NaiveDate>,
    /// Attached categories, eagerly loaded.
    pub categories: Vec<Category>,
    /// Store-managed creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Store-managed last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Whether the todo is past due: due before `today` and not completed.
    ///
    /// Always `false` without a due date or once completed. Computed at
    /// projection time, never stored.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| due < today) && !self.completed
    }

    /// Whether the todo is due exactly on `today` and not completed.
    #[must_use]
    pub fn is_due_today(&self, today: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| due == today) && !self.completed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use chrono::Duration;

    fn todo_due(due_date: Option<NaiveDate>, completed: bool) -> Todo {
        Todo {
            id: TodoId::new(),
            user_id: UserId::new(),
            title: "t".to_string(),
            description: None,
            completed,
            priority: None,
            due_date,
            categories: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn priority_labels_and_colors() {
        assert_eq!(Priority::High.label(), "High");
        assert_eq!(Priority::Medium.label(), "Medium");
        assert_eq!(Priority::Low.label(), "Low");
        assert_eq!(Priority::High.color(), "#EF4444");
        assert_eq!(Priority::Medium.color(), "#F59E0B");
        assert_eq!(Priority::Low.color(), "#10B981");
    }

    #[test]
    fn priority_wire_round_trip() {
        for p in [Priority::High, Priority::Medium, Priority::Low] {
            assert_eq!(Priority::parse(p.as_str()), Some(p));
        }
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(Priority::parse("HIGH"), None);
    }

    #[test]
    fn priority_orders_by_rank() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
    }

    #[test]
    fn overdue_requires_past_due_date_and_incomplete() {
        let today = Utc::now().date_naive();
        let yesterday = today - Duration::days(1);

        assert!(todo_due(Some(yesterday), false).is_overdue(today));
        assert!(!todo_due(Some(yesterday), true).is_overdue(today));
        assert!(!todo_due(Some(today), false).is_overdue(today));
        assert!(!todo_due(None, false).is_overdue(today));
    }

    #[test]
    fn due_today_requires_exact_date_and_incomplete() {
        let today = Utc::now().date_naive();
        let tomorrow = today + Duration::days(1);

        assert!(todo_due(Some(today), false).is_due_today(today));
        assert!(!todo_due(Some(today), true).is_due_today(today));
        assert!(!todo_due(Some(tomorrow), false).is_due_today(today));
        assert!(!todo_due(None, false).is_due_today(today));
    }
}
