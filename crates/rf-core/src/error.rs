//! # AppError
//!
//! Centralized error handling for the Rusty-Forum stores.
//! Lookups, validation, storage and credential failures each get their own
//! variant so the HTTP layer can pick a status code without string matching.

use thiserror::Error;

/// The primary error type for all rf-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// A point lookup matched no row (entity name, lookup key).
    #[error("{0} not found with {1}")]
    NotFound(String, String),

    /// One or more business rules were violated. Always the complete list.
    #[error("validation failed: {}", .0.join(" "))]
    ValidationFailed(Vec<String>),

    /// Query execution failed (connectivity, constraint, malformed SQL).
    #[error("storage error: {0}")]
    Storage(String),

    /// An operation-specific invariant was violated before storage was touched.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// Credential mismatch or an ownership check failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure failure outside the database (hasher, runtime).
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &str, key: impl std::fmt::Display) -> Self {
        AppError::NotFound(entity.to_string(), key.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(..))
    }
}

/// A specialized Result type for Rusty-Forum logic.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_key() {
        let err = AppError::not_found("forum", "id 7");
        assert_eq!(err.to_string(), "forum not found with id 7");
        assert!(err.is_not_found());
        assert!(!AppError::Storage("boom".into()).is_not_found());
    }

    #[test]
    fn validation_message_lists_every_violation() {
        let err = AppError::ValidationFailed(vec![
            "Title must not be empty.".into(),
            "Forum does not exist.".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: Title must not be empty. Forum does not exist."
        );
    }
}
