//! Axum HTTP shell for the Tasklist service.
//!
//! Thin plumbing around `tasklist-core`: every handler runs the same
//! pipeline — extract the principal, validate the payload, authorize
//! against the owner, execute one action through the repository, project
//! the result to its wire shape.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Imperative Shell (Axum)          │  ← HTTP, JSON, tracing
//! ├─────────────────────────────────────────┤
//! │        tasklist-core                    │
//! │  - validation / authorization           │
//! │  - actions and filter engine            │  ← testable at memory speed
//! └─────────────────────────────────────────┘
//! ```
//!
//! The router is generic over the repository, so the binary wires it to
//! `tasklist-postgres` while tests use the in-memory mock.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod resources;
pub mod router;
pub mod state;

pub use config::AppConfig;
pub use error::AppError;
pub use router::api_router;
pub use state::AppState;
