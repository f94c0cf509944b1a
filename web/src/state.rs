//! Application state for Axum handlers.

/// Application state shared across all HTTP handlers.
///
/// Generic over the repository so the binary can wire the PostgreSQL
/// implementation while tests use the in-memory mock.
#[derive(Debug, Clone)]
pub struct AppState<R> {
    /// Repository backing all domain operations.
    pub repo: R,
}

impl<R> AppState<R> {
    /// Create a new application state.
    pub const fn new(repo: R) -> Self {
        Self { repo }
    }
}
