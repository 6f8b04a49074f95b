//! Error types for the AgriBridge system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgriError {
    #[error("{entity} not found")]
    NotFound { entity: String, id: String },

    /// A lookup that is scoped by something other than a record id came
    /// back empty. The message is shown to the caller as is.
    #[error("{0}")]
    NoData(String),

    #[error("{entity} already exists")]
    Conflict { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// No credentials were presented with the request.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Username/password pair rejected. Deliberately silent about which
    /// half was wrong.
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("{0}")]
    UnsupportedOperation(String),

    #[error("Invalid signature")]
    InvalidSignature,

    /// A collaborator is not configured or not reachable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgriError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type AgriResult<T> = Result<T, AgriError>;
