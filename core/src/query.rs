//! List-todos filtering and sorting.
//!
//! [`TodoFilter`] captures the query parameters of a list request in typed
//! form. The pure [`TodoFilter::matches`] / [`TodoFilter::sort`] pair is
//! the reference semantics: the in-memory repository evaluates it directly
//! and the PostgreSQL repository translates the same rules to SQL.

use crate::types::{Priority, Todo};
use chrono::{Days, NaiveDate};
use std::cmp::Ordering;

/// Window, in days, of the `due_soon` status filter.
pub const DUE_SOON_DAYS: u64 = 7;

/// Derived-status scope for list requests. The variants are mutually
/// exclusive; all of them exclude completed todos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Due strictly before today.
    Overdue,
    /// Due exactly today.
    DueToday,
    /// Due within the next [`DUE_SOON_DAYS`] days (today inclusive).
    DueSoon,
}

impl StatusFilter {
    /// Parse a `status` query parameter. Unrecognized values apply no
    /// filter.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "overdue" => Some(Self::Overdue),
            "due_today" => Some(Self::DueToday),
            "due_soon" => Some(Self::DueSoon),
            _ => None,
        }
    }
}

/// Sortable columns. A fixed whitelist so caller input never reaches the
/// store as a column name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    /// Creation timestamp (the default).
    #[default]
    CreatedAt,
    /// Due date, nulls last.
    DueDate,
    /// Title, lexicographic.
    Title,
    /// Priority by rank (low < medium < high), nulls last.
    Priority,
}

impl SortField {
    /// Parse a `sort_by` parameter; anything outside the whitelist falls
    /// back to the default.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "due_date" => Self::DueDate,
            "title" => Self::Title,
            "priority" => Self::Priority,
            _ => Self::CreatedAt,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending (the default).
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse a `sort_order` parameter; anything but `asc` sorts
    /// descending.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == "asc" { Self::Asc } else { Self::Desc }
    }
}

/// Typed form of the list-todos query parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoFilter {
    /// Derived-status scope, if requested.
    pub status: Option<StatusFilter>,
    /// Exact priority match, if requested.
    pub priority: Option<Priority>,
    /// Sort column.
    pub sort_by: SortField,
    /// Sort direction.
    pub sort_order: SortOrder,
}

impl TodoFilter {
    /// Build a filter from raw query parameters.
    ///
    /// Unrecognized `status`, `priority` or `sort_by` values apply no
    /// filter / fall back to the default sort rather than failing the
    /// request.
    #[must_use]
    pub fn from_params(
        priority: Option<&str>,
        status: Option<&str>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Self {
        Self {
            status: status.and_then(StatusFilter::parse),
            priority: priority.and_then(Priority::parse),
            sort_by: sort_by.map(SortField::parse).unwrap_or_default(),
            sort_order: sort_order.map(SortOrder::parse).unwrap_or_default(),
        }
    }

    /// Whether `todo` passes the status and priority predicates.
    #[must_use]
    pub fn matches(&self, todo: &Todo, today: NaiveDate) -> bool {
        if let Some(priority) = self.priority {
            if todo.priority != Some(priority) {
                return false;
            }
        }

        match self.status {
            None => true,
            Some(StatusFilter::Overdue) => todo.is_overdue(today),
            Some(StatusFilter::DueToday) => todo.is_due_today(today),
            Some(StatusFilter::DueSoon) => {
                let horizon = today + Days::new(DUE_SOON_DAYS);
                !todo.completed
                    && todo
                        .due_date
                        .is_some_and(|due| due >= today && due <= horizon)
            }
        }
    }

    /// Sort `todos` in place per the requested column and direction.
    ///
    /// Todos without a value for the sort column (no due date, no
    /// priority) sort last in both directions. The sort is stable.
    pub fn sort(&self, todos: &mut [Todo]) {
        todos.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        match self.sort_by {
            SortField::CreatedAt => self.direct(a.created_at.cmp(&b.created_at)),
            SortField::Title => self.direct(a.title.cmp(&b.title)),
            SortField::DueDate => self.nulls_last(a.due_date, b.due_date),
            SortField::Priority => self.nulls_last(a.priority, b.priority),
        }
    }

    fn direct(&self, ordering: Ordering) -> Ordering {
        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    fn nulls_last<T: Ord>(&self, a: Option<T>, b: Option<T>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => self.direct(a.cmp(&b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::types::{Todo, TodoId, UserId};
    use chrono::{DateTime, Duration, Utc};

    fn todo(title: &str, due: Option<NaiveDate>, priority: Option<Priority>) -> Todo {
        Todo {
            id: TodoId::new(),
            user_id: UserId::new(),
            title: title.to_string(),
            description: None,
            completed: false,
            priority,
            due_date: due,
            categories: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    #[test]
    fn unrecognized_params_apply_no_filter() {
        let filter = TodoFilter::from_params(Some("urgent"), Some("someday"), None, None);
        assert_eq!(filter, TodoFilter::default());
    }

    #[test]
    fn overdue_excludes_completed_and_today() {
        let filter = TodoFilter::from_params(None, Some("overdue"), None, None);
        let yesterday = today() - Duration::days(1);

        assert!(filter.matches(&todo("a", Some(yesterday), None), today()));
        assert!(!filter.matches(&todo("b", Some(today()), None), today()));
        assert!(!filter.matches(&todo("c", None, None), today()));

        let mut done = todo("d", Some(yesterday), None);
        done.completed = true;
        assert!(!filter.matches(&done, today()));
    }

    #[test]
    fn due_today_matches_exact_date() {
        let filter = TodoFilter::from_params(None, Some("due_today"), None, None);

        assert!(filter.matches(&todo("a", Some(today()), None), today()));
        assert!(!filter.matches(&todo("b", Some(today() + Duration::days(1)), None), today()));
    }

    #[test]
    fn due_soon_spans_seven_days_inclusive() {
        let filter = TodoFilter::from_params(None, Some("due_soon"), None, None);

        assert!(filter.matches(&todo("a", Some(today()), None), today()));
        assert!(filter.matches(&todo("b", Some(today() + Duration::days(7)), None), today()));
        assert!(!filter.matches(&todo("c", Some(today() + Duration::days(8)), None), today()));
        assert!(!filter.matches(&todo("d", Some(today() - Duration::days(1)), None), today()));
    }

    #[test]
    fn priority_filter_is_exact() {
        let filter = TodoFilter::from_params(Some("high"), None, None, None);

        assert!(filter.matches(&todo("a", None, Some(Priority::High)), today()));
        assert!(!filter.matches(&todo("b", None, Some(Priority::Low)), today()));
        assert!(!filter.matches(&todo("c", None, None), today()));
    }

    #[test]
    fn priority_and_status_compose() {
        let filter = TodoFilter::from_params(Some("high"), Some("overdue"), None, None);
        let yesterday = today() - Duration::days(1);

        assert!(filter.matches(&todo("a", Some(yesterday), Some(Priority::High)), today()));
        assert!(!filter.matches(&todo("b", Some(yesterday), Some(Priority::Low)), today()));
    }

    #[test]
    fn default_sort_is_created_at_desc() {
        let filter = TodoFilter::default();
        let mut first = todo("first", None, None);
        let mut second = todo("second", None, None);
        first.created_at = DateTime::<Utc>::UNIX_EPOCH;
        second.created_at = DateTime::<Utc>::UNIX_EPOCH + Duration::days(1);

        let mut todos = vec![first, second];
        filter.sort(&mut todos);

        assert_eq!(todos[0].title, "second");
        assert_eq!(todos[1].title, "first");
    }

    #[test]
    fn due_date_asc_sorts_nulls_last() {
        let filter = TodoFilter::from_params(None, None, Some("due_date"), Some("asc"));
        let mut todos = vec![
            todo("none", None, None),
            todo("later", Some(today() + Duration::days(3)), None),
            todo("sooner", Some(today() + Duration::days(1)), None),
        ];
        filter.sort(&mut todos);

        let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["sooner", "later", "none"]);
    }

    #[test]
    fn due_date_desc_still_sorts_nulls_last() {
        let filter = TodoFilter::from_params(None, None, Some("due_date"), Some("desc"));
        let mut todos = vec![
            todo("none", None, None),
            todo("sooner", Some(today() + Duration::days(1)), None),
            todo("later", Some(today() + Duration::days(3)), None),
        ];
        filter.sort(&mut todos);

        let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["later", "sooner", "none"]);
    }

    #[test]
    fn priority_sorts_by_rank() {
        let filter = TodoFilter::from_params(None, None, Some("priority"), Some("asc"));
        let mut todos = vec![
            todo("high", None, Some(Priority::High)),
            todo("none", None, None),
            todo("low", None, Some(Priority::Low)),
            todo("medium", None, Some(Priority::Medium)),
        ];
        filter.sort(&mut todos);

        let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["low", "medium", "high", "none"]);
    }

    #[test]
    fn title_sort_is_lexicographic() {
        let filter = TodoFilter::from_params(None, None, Some("title"), Some("asc"));
        let mut todos = vec![todo("b", None, None), todo("a", None, None)];
        filter.sort(&mut todos);

        assert_eq!(todos[0].title, "a");
    }
}
