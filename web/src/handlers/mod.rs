//! HTTP handlers.
//!
//! One module per resource; every handler runs the validate → authorize →
//! action → project pipeline to completion before returning.

pub mod categories;
pub mod health;
pub mod todos;
