//! # Tasklist Core
//!
//! Domain model and request-handling contract for the Tasklist service:
//! entities and their invariants, per-operation validation, ownership-based
//! authorization, atomic domain actions and the list-filtering engine.
//!
//! The crate is transport- and storage-agnostic. Persistence is reached
//! through the [`repository`] traits; the HTTP shell lives in
//! `tasklist-web` and the PostgreSQL implementation in `tasklist-postgres`.
//!
//! # Request flow
//!
//! ```text
//! request → validate → authorize → action → repository → projection
//! ```
//!
//! Every action is a single unit of work over one aggregate (one todo, one
//! category or one junction row); nothing here suspends mid-pipeline
//! awaiting another request.
//!
//! # Example
//!
//! ```ignore
//! use tasklist_core::{actions, policy::{self, Ability}, validate};
//!
//! let draft = validate::validate_todo_create(payload, today)?;
//! let todo = actions::create_todo(&repo, user, draft).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod actions;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;
pub mod patch;
pub mod policy;
pub mod query;
pub mod repository;
pub mod types;
pub mod validate;

pub use error::{Error, Result};
pub use patch::Patch;
pub use query::TodoFilter;
pub use repository::{CategoryRepository, TodoRepository};
pub use types::{Category, CategoryId, Priority, Todo, TodoId, UserId};
