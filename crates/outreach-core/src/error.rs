//! Error types for the Outreach system.
//!
//! A missing record is never an error here: lookups return `Option`
//! and searches return an empty `Vec`.

use thiserror::Error;

use crate::validation::FieldViolation;

#[derive(Debug, Error)]
pub enum OutreachError {
    #[error("Validation failed with {} violation(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Tenant context missing or invalid: {0}")]
    TenantContext(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OutreachError {
    /// Shorthand for a validation error carrying a single violation.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }
}

pub type OutreachResult<T> = Result<T, OutreachError>;
