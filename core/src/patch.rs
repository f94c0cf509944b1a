//! Three-state patch fields for partial updates.
//!
//! JSON partial updates need to distinguish "field omitted" (leave the
//! stored value untouched) from "field set to null" (actively clear it).
//! [`Patch`] makes that distinction explicit at the type level so the
//! action layer owns merge semantics instead of every call site.

use serde::{Deserialize, Deserializer};

/// A single field of a partial-update payload.
///
/// Deserializes from JSON as:
/// - absent key → [`Patch::Missing`] (requires `#[serde(default)]`)
/// - `null` → [`Patch::Null`]
/// - value → [`Patch::Value`]
///
/// # Example
///
/// ```
/// use serde::Deserialize;
/// use tasklist_core::Patch;
///
/// #[derive(Deserialize)]
/// struct Body {
///     #[serde(default)]
///     priority: Patch<String>,
/// }
///
/// let body: Body = serde_json::from_str("{}").unwrap();
/// assert!(body.priority.is_missing());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Field was not present in the payload; keep the current value.
    #[default]
    Missing,
    /// Field was explicitly `null`; clear the current value.
    Null,
    /// Field was supplied; replace the current value.
    Value(T),
}

impl<T> Patch<T> {
    /// Whether the field was absent from the payload.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Merge this patch onto the currently stored value.
    ///
    /// `Missing` keeps `current`, `Null` clears it, `Value` replaces it.
    #[must_use]
    pub fn resolve(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Missing => current,
            Self::Null => None,
            Self::Value(value) => Some(value),
        }
    }

    /// Map the contained value, preserving `Missing`/`Null`.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Self::Missing => Patch::Missing,
            Self::Null => Patch::Null,
            Self::Value(value) => Patch::Value(f(value)),
        }
    }

    /// Borrow the contained value, if any.
    #[must_use]
    pub const fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Missing => Patch::Missing,
            Self::Null => Patch::Null,
            Self::Value(value) => Patch::Value(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A present key deserializes as Option: null → Null, value → Value.
        // Absent keys never reach this impl; serde(default) yields Missing.
        Option::<T>::deserialize(deserializer).map(|opt| opt.map_or(Self::Null, Self::Value))
    }
}
