//! # AppError
//!
//! Centralized error handling for Fritter.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all fr-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Filter, Freet, Intent)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// The requester may not read or modify the resource
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The operation needs a known requester
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Validation failure (e.g., malformed tag label, unknown intent)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Resource already exists (e.g., a second intent for one freet)
    #[error("conflict: {0}")]
    Conflict(String),

    /// A relation lookup or freet fetch failed while aggregating.
    /// Never accompanied by a partial result.
    #[error("lookup failed: {0}")]
    LookupFailure(String),

    /// Infrastructure failure outside of aggregation (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: &str, id: impl ToString) -> Self {
        AppError::NotFound(what.to_string(), id.to_string())
    }

    pub(crate) fn lookup(err: anyhow::Error) -> Self {
        AppError::LookupFailure(format!("{err:#}"))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{err:#}"))
    }
}

/// A specialized Result type for Fritter logic.
pub type Result<T> = std::result::Result<T, AppError>;
