//! Database-specific error types and conversions.

use outreach_core::error::OutreachError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Statement failed: {0}")]
    Statement(String),

    #[error("Invalid {entity} record: {message}")]
    InvalidRecord {
        entity: &'static str,
        message: String,
    },

    #[error("Store returned no {entity} for id {id}")]
    MissingResult { entity: &'static str, id: String },
}

impl DbError {
    pub(crate) fn invalid(entity: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            entity,
            message: message.into(),
        }
    }
}

impl From<DbError> for OutreachError {
    fn from(err: DbError) -> Self {
        OutreachError::Database(err.to_string())
    }
}
