//! Error taxonomy for domain operations.

use crate::validate::ValidationErrors;
use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure modes of the validation → authorization → action pipeline.
///
/// All variants are terminal for the request; nothing is retried
/// internally. The web layer maps each variant to its HTTP status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// One or more input constraints were violated (422).
    #[error("The given data was invalid")]
    Validation(ValidationErrors),

    /// The requested resource id does not resolve (404).
    #[error("{resource} not found")]
    NotFound {
        /// Resource kind, e.g. "Todo" or "Category".
        resource: &'static str,
    },

    /// Authenticated principal is not the owner of the resource (403).
    #[error("This action is unauthorized")]
    Forbidden,

    /// No valid principal was supplied (401).
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Unexpected persistence failure (500). The message is logged, never
    /// exposed to clients.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
