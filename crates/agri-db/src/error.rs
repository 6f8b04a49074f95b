//! Database-specific error types and conversions.

use agri_core::error::AgriError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("{entity} already exists")]
    Conflict { entity: String },
}

impl DbError {
    /// Classify a statement error raised by `Response::check`.
    ///
    /// Unique index and duplicate record-id violations become `Conflict`.
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already exists") || message.contains("already contains") {
            DbError::Conflict {
                entity: entity.to_string(),
            }
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for AgriError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AgriError::NotFound { entity, id },
            DbError::Conflict { entity } => AgriError::Conflict { entity },
            other => AgriError::Database(other.to_string()),
        }
    }
}
