//! Per-operation input validation.
//!
//! Request payloads are deserialized loosely ([`serde_json::Value`] for
//! every scalar field) and validated here into typed drafts and patches,
//! so every constraint violation — a wrong JSON type included — surfaces
//! as a field-keyed message instead of a transport-level rejection. A
//! request that fails validation never reaches an action.

use crate::patch::Patch;
use crate::types::{DEFAULT_CATEGORY_COLOR, Priority};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Maximum length of a todo title.
pub const TITLE_MAX_CHARS: usize = 255;

/// Maximum length of a category name.
pub const NAME_MAX_CHARS: usize = 50;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ═══════════════════════════════════════════════════════════════════════
// Validation errors
// ═══════════════════════════════════════════════════════════════════════

/// Field-keyed validation messages.
///
/// Serializes as `{"field": ["message", ...]}`. Keys are ordered so error
/// bodies are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    /// Record a violation against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Whether no violations were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages recorded against `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Turn an accumulated set into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` if any violation was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Todo payloads
// ═══════════════════════════════════════════════════════════════════════

/// Raw todo-create payload, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoCreateRequest {
    /// Required title.
    #[serde(default)]
    pub title: Patch<Value>,
    /// Optional nullable description.
    #[serde(default)]
    pub description: Patch<Value>,
    /// Optional completion flag, defaults to `false`.
    #[serde(default)]
    pub completed: Patch<Value>,
    /// Optional nullable priority (wire string, decoded here).
    #[serde(default)]
    pub priority: Patch<Value>,
    /// Optional nullable due date (`YYYY-MM-DD`, decoded here).
    #[serde(default)]
    pub due_date: Patch<Value>,
}

/// Raw todo-update payload; every field is `sometimes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoUpdateRequest {
    /// New title, when present; explicit null is rejected.
    #[serde(default)]
    pub title: Patch<Value>,
    /// New description, when present; null clears it.
    #[serde(default)]
    pub description: Patch<Value>,
    /// New completion flag, when present; explicit null is rejected.
    #[serde(default)]
    pub completed: Patch<Value>,
    /// New priority, when present; null clears it.
    #[serde(default)]
    pub priority: Patch<Value>,
    /// New due date, when present; null clears it. No past-date check.
    #[serde(default)]
    pub due_date: Patch<Value>,
}

/// Fully-validated todo-create input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    /// Non-blank title, ≤ 255 characters.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Completion flag (`false` when omitted).
    pub completed: bool,
    /// Decoded priority.
    pub priority: Option<Priority>,
    /// Decoded due date, not before the creation date.
    pub due_date: Option<NaiveDate>,
}

/// Fully-validated todo-update patch.
///
/// Fields that can never be null stay `Option`; nullable fields keep the
/// three-state [`Patch`] so the update action can tell omitted from
/// cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    /// Replacement title, when supplied.
    pub title: Option<String>,
    /// Description change, when supplied.
    pub description: Patch<String>,
    /// Replacement completion flag, when supplied.
    pub completed: Option<bool>,
    /// Priority change, when supplied.
    pub priority: Patch<Priority>,
    /// Due-date change, when supplied.
    pub due_date: Patch<NaiveDate>,
}

/// Validate a todo-create payload.
///
/// `today` anchors the no-past-due-date rule, which applies only at
/// creation.
///
/// # Errors
///
/// Returns the field-keyed violations when any rule fails.
pub fn validate_todo_create(
    request: TodoCreateRequest,
    today: NaiveDate,
) -> Result<TodoDraft, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = match request.title {
        Patch::Value(Value::String(title)) => {
            let title = title.trim().to_string();
            if title.is_empty() {
                errors.add("title", "The title field is required.");
            } else {
                check_char_cap(&mut errors, "title", &title, TITLE_MAX_CHARS);
            }
            title
        }
        Patch::Value(_) => {
            errors.add("title", "The title must be a string.");
            String::new()
        }
        Patch::Missing | Patch::Null => {
            errors.add("title", "The title field is required.");
            String::new()
        }
    };

    let description = decode_string(&mut errors, "description", request.description).resolve(None);

    let completed = match request.completed {
        Patch::Missing => false,
        Patch::Value(Value::Bool(completed)) => completed,
        Patch::Null | Patch::Value(_) => {
            errors.add("completed", "The completed field must be true or false.");
            false
        }
    };

    let priority = validate_priority(&mut errors, request.priority).resolve(None);
    let due_date = match validate_date(&mut errors, request.due_date) {
        Patch::Value(date) if date < today => {
            errors.add("due_date", "The due date must be today or a future date.");
            None
        }
        patch => patch.resolve(None),
    };

    errors.into_result()?;

    Ok(TodoDraft {
        title,
        description,
        completed,
        priority,
        due_date,
    })
}

/// Validate a todo-update payload.
///
/// Same per-field constraints as create, except past due dates are
/// accepted.
///
/// # Errors
///
/// Returns the field-keyed violations when any rule fails.
pub fn validate_todo_update(request: TodoUpdateRequest) -> Result<TodoPatch, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = match request.title {
        Patch::Missing => None,
        Patch::Null => {
            errors.add("title", "The title field is required.");
            None
        }
        Patch::Value(Value::String(title)) => {
            let title = title.trim().to_string();
            if title.is_empty() {
                errors.add("title", "The title field is required.");
            } else {
                check_char_cap(&mut errors, "title", &title, TITLE_MAX_CHARS);
            }
            Some(title)
        }
        Patch::Value(_) => {
            errors.add("title", "The title must be a string.");
            None
        }
    };

    let completed = match request.completed {
        Patch::Missing => None,
        Patch::Value(Value::Bool(completed)) => Some(completed),
        Patch::Null | Patch::Value(_) => {
            errors.add("completed", "The completed field must be true or false.");
            None
        }
    };

    let description = decode_string(&mut errors, "description", request.description);
    let priority = validate_priority(&mut errors, request.priority);
    let due_date = validate_date(&mut errors, request.due_date);

    errors.into_result()?;

    Ok(TodoPatch {
        title,
        description,
        completed,
        priority,
        due_date,
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Category payloads
// ═══════════════════════════════════════════════════════════════════════

/// Raw category-create payload, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryCreateRequest {
    /// Required name.
    #[serde(default)]
    pub name: Patch<Value>,
    /// Hex color; the default is supplied when absent.
    #[serde(default)]
    pub color: Patch<Value>,
}

/// Raw category-update payload; both fields are `sometimes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdateRequest {
    /// New name, when present; explicit null is rejected.
    #[serde(default)]
    pub name: Patch<Value>,
    /// New color, when present; explicit null is rejected.
    #[serde(default)]
    pub color: Patch<Value>,
}

/// Fully-validated category-create input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    /// Non-blank name, ≤ 50 characters.
    pub name: String,
    /// 6-digit hex color.
    pub color: String,
}

/// Fully-validated category-update patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    /// Replacement name, when supplied.
    pub name: Option<String>,
    /// Replacement color, when supplied.
    pub color: Option<String>,
}

/// Validate a category-create payload.
///
/// # Errors
///
/// Returns the field-keyed violations when any rule fails.
pub fn validate_category_create(
    request: CategoryCreateRequest,
) -> Result<CategoryDraft, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = match request.name {
        Patch::Value(Value::String(name)) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                errors.add("name", "The name field is required.");
            } else {
                check_char_cap(&mut errors, "name", &name, NAME_MAX_CHARS);
            }
            name
        }
        Patch::Value(_) => {
            errors.add("name", "The name must be a string.");
            String::new()
        }
        Patch::Missing | Patch::Null => {
            errors.add("name", "The name field is required.");
            String::new()
        }
    };

    let color = match request.color {
        Patch::Missing | Patch::Null => DEFAULT_CATEGORY_COLOR.to_string(),
        Patch::Value(Value::String(color)) => {
            check_hex_color(&mut errors, &color);
            color
        }
        Patch::Value(_) => {
            errors.add("color", "The color must be a 6-digit hex color.");
            String::new()
        }
    };

    errors.into_result()?;

    Ok(CategoryDraft { name, color })
}

/// Validate a category-update payload.
///
/// # Errors
///
/// Returns the field-keyed violations when any rule fails.
pub fn validate_category_update(
    request: CategoryUpdateRequest,
) -> Result<CategoryPatch, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = match request.name {
        Patch::Missing => None,
        Patch::Null => {
            errors.add("name", "The name field is required.");
            None
        }
        Patch::Value(Value::String(name)) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                errors.add("name", "The name field is required.");
            } else {
                check_char_cap(&mut errors, "name", &name, NAME_MAX_CHARS);
            }
            Some(name)
        }
        Patch::Value(_) => {
            errors.add("name", "The name must be a string.");
            None
        }
    };

    let color = match request.color {
        Patch::Missing => None,
        Patch::Null => {
            errors.add("color", "The color field is required.");
            None
        }
        Patch::Value(Value::String(color)) => {
            check_hex_color(&mut errors, &color);
            Some(color)
        }
        Patch::Value(_) => {
            errors.add("color", "The color must be a 6-digit hex color.");
            None
        }
    };

    errors.into_result()?;

    Ok(CategoryPatch { name, color })
}

// ═══════════════════════════════════════════════════════════════════════
// Field helpers
// ═══════════════════════════════════════════════════════════════════════

/// Decode a nullable free-form string field, recording a violation for
/// non-string values.
fn decode_string(errors: &mut ValidationErrors, field: &str, raw: Patch<Value>) -> Patch<String> {
    match raw {
        Patch::Missing => Patch::Missing,
        Patch::Null => Patch::Null,
        Patch::Value(Value::String(value)) => Patch::Value(value),
        Patch::Value(_) => {
            errors.add(field, format!("The {field} must be a string."));
            Patch::Missing
        }
    }
}

fn check_char_cap(errors: &mut ValidationErrors, field: &str, value: &str, cap: usize) {
    if value.chars().count() > cap {
        errors.add(
            field,
            format!("The {field} may not be greater than {cap} characters."),
        );
    }
}

fn check_hex_color(errors: &mut ValidationErrors, color: &str) {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        errors.add("color", "The color must be a 6-digit hex color.");
    }
}

fn validate_priority(errors: &mut ValidationErrors, raw: Patch<Value>) -> Patch<Priority> {
    match raw {
        Patch::Missing => Patch::Missing,
        Patch::Null => Patch::Null,
        Patch::Value(value) => match value.as_str().and_then(Priority::parse) {
            Some(priority) => Patch::Value(priority),
            None => {
                errors.add("priority", "The selected priority is invalid.");
                Patch::Missing
            }
        },
    }
}

fn validate_date(errors: &mut ValidationErrors, raw: Patch<Value>) -> Patch<NaiveDate> {
    match raw {
        Patch::Missing => Patch::Missing,
        Patch::Null => Patch::Null,
        Patch::Value(value) => {
            match value
                .as_str()
                .map(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT))
            {
                Some(Ok(date)) => Patch::Value(date),
                _ => {
                    errors.add("due_date", "The due date is not a valid date.");
                    Patch::Missing
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    #[test]
    fn create_requires_title() {
        let err = validate_todo_create(TodoCreateRequest::default(), today()).unwrap_err();
        assert!(err.get("title").is_some());
    }

    #[test]
    fn create_rejects_blank_title() {
        let request = TodoCreateRequest {
            title: Patch::Value(json!("   ")),
            ..Default::default()
        };
        let err = validate_todo_create(request, today()).unwrap_err();
        assert!(err.get("title").is_some());
    }

    #[test]
    fn create_rejects_non_string_title() {
        let request = TodoCreateRequest {
            title: Patch::Value(json!(123)),
            ..Default::default()
        };
        let err = validate_todo_create(request, today()).unwrap_err();
        assert_eq!(
            err.get("title"),
            Some(&["The title must be a string.".to_string()][..])
        );
    }

    #[test]
    fn create_caps_title_length() {
        let request = TodoCreateRequest {
            title: Patch::Value(json!("x".repeat(256))),
            ..Default::default()
        };
        let err = validate_todo_create(request, today()).unwrap_err();
        assert!(err.get("title").is_some());

        let request = TodoCreateRequest {
            title: Patch::Value(json!("x".repeat(255))),
            ..Default::default()
        };
        assert!(validate_todo_create(request, today()).is_ok());
    }

    #[test]
    fn create_defaults_completed_to_false() {
        let request = TodoCreateRequest {
            title: Patch::Value(json!("Buy milk")),
            ..Default::default()
        };
        let draft = validate_todo_create(request, today()).unwrap();
        assert!(!draft.completed);
        assert_eq!(draft.description, None);
        assert_eq!(draft.priority, None);
        assert_eq!(draft.due_date, None);
    }

    #[test]
    fn create_rejects_non_boolean_completed() {
        let request = TodoCreateRequest {
            title: Patch::Value(json!("x")),
            completed: Patch::Value(json!("yes")),
            ..Default::default()
        };
        let err = validate_todo_create(request, today()).unwrap_err();
        assert_eq!(
            err.get("completed"),
            Some(&["The completed field must be true or false.".to_string()][..])
        );
    }

    #[test]
    fn create_rejects_past_due_date() {
        let yesterday = today() - Duration::days(1);
        let request = TodoCreateRequest {
            title: Patch::Value(json!("x")),
            due_date: Patch::Value(json!(yesterday.format("%Y-%m-%d").to_string())),
            ..Default::default()
        };
        let err = validate_todo_create(request, today()).unwrap_err();
        assert_eq!(
            err.get("due_date"),
            Some(&["The due date must be today or a future date.".to_string()][..])
        );
    }

    #[test]
    fn create_accepts_today_as_due_date() {
        let request = TodoCreateRequest {
            title: Patch::Value(json!("x")),
            due_date: Patch::Value(json!(today().format("%Y-%m-%d").to_string())),
            ..Default::default()
        };
        let draft = validate_todo_create(request, today()).unwrap();
        assert_eq!(draft.due_date, Some(today()));
    }

    #[test]
    fn create_rejects_unknown_priority() {
        for bad in [json!("urgent"), json!(2)] {
            let request = TodoCreateRequest {
                title: Patch::Value(json!("x")),
                priority: Patch::Value(bad),
                ..Default::default()
            };
            let err = validate_todo_create(request, today()).unwrap_err();
            assert!(err.get("priority").is_some());
        }
    }

    #[test]
    fn create_decodes_priority() {
        let request = TodoCreateRequest {
            title: Patch::Value(json!("Pay bill")),
            priority: Patch::Value(json!("high")),
            ..Default::default()
        };
        let draft = validate_todo_create(request, today()).unwrap();
        assert_eq!(draft.priority, Some(Priority::High));
    }

    #[test]
    fn update_accepts_past_due_date() {
        let yesterday = today() - Duration::days(1);
        let request = TodoUpdateRequest {
            due_date: Patch::Value(json!(yesterday.format("%Y-%m-%d").to_string())),
            ..Default::default()
        };
        let patch = validate_todo_update(request).unwrap();
        assert_eq!(patch.due_date, Patch::Value(yesterday));
    }

    #[test]
    fn update_rejects_null_title() {
        let request = TodoUpdateRequest {
            title: Patch::Null,
            ..Default::default()
        };
        let err = validate_todo_update(request).unwrap_err();
        assert!(err.get("title").is_some());
    }

    #[test]
    fn update_rejects_null_completed() {
        let request = TodoUpdateRequest {
            completed: Patch::Null,
            ..Default::default()
        };
        let err = validate_todo_update(request).unwrap_err();
        assert!(err.get("completed").is_some());
    }

    #[test]
    fn update_rejects_non_boolean_completed() {
        let request = TodoUpdateRequest {
            completed: Patch::Value(json!("yes")),
            ..Default::default()
        };
        let err = validate_todo_update(request).unwrap_err();
        assert_eq!(
            err.get("completed"),
            Some(&["The completed field must be true or false.".to_string()][..])
        );
    }

    #[test]
    fn update_rejects_non_string_description() {
        let request = TodoUpdateRequest {
            description: Patch::Value(json!(["not", "a", "string"])),
            ..Default::default()
        };
        let err = validate_todo_update(request).unwrap_err();
        assert!(err.get("description").is_some());
    }

    #[test]
    fn update_keeps_omitted_fields_missing() {
        let patch = validate_todo_update(TodoUpdateRequest::default()).unwrap();
        assert_eq!(patch, TodoPatch::default());
    }

    #[test]
    fn update_null_priority_clears() {
        let request = TodoUpdateRequest {
            priority: Patch::Null,
            ..Default::default()
        };
        let patch = validate_todo_update(request).unwrap();
        assert_eq!(patch.priority, Patch::Null);
    }

    #[test]
    fn category_create_defaults_color() {
        let request = CategoryCreateRequest {
            name: Patch::Value(json!("Work")),
            color: Patch::Missing,
        };
        let draft = validate_category_create(request).unwrap();
        assert_eq!(draft.color, DEFAULT_CATEGORY_COLOR);
    }

    #[test]
    fn category_create_rejects_bad_color() {
        for bad in [
            json!("3B82F6"),
            json!("#3B82F"),
            json!("#3B82FG"),
            json!("#3B82F6A"),
            json!(3_947_510),
        ] {
            let request = CategoryCreateRequest {
                name: Patch::Value(json!("Work")),
                color: Patch::Value(bad.clone()),
            };
            let err = validate_category_create(request).unwrap_err();
            assert!(err.get("color").is_some(), "{bad} should be rejected");
        }
    }

    #[test]
    fn category_create_caps_name() {
        let request = CategoryCreateRequest {
            name: Patch::Value(json!("x".repeat(51))),
            color: Patch::Missing,
        };
        let err = validate_category_create(request).unwrap_err();
        assert!(err.get("name").is_some());
    }

    #[test]
    fn category_update_rejects_null_color() {
        let request = CategoryUpdateRequest {
            color: Patch::Null,
            ..Default::default()
        };
        let err = validate_category_update(request).unwrap_err();
        assert!(err.get("color").is_some());
    }

    #[test]
    fn errors_serialize_field_keyed() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "The title field is required.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["title"][0], "The title field is required.");
    }
}
