//! Authentication error types.

use agri_core::error::AgriError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No usable bearer credential on the request.
    #[error("missing bearer credentials")]
    MissingCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("invalid auth configuration: {0}")]
    Config(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for AgriError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AgriError::InvalidCredentials,
            AuthError::MissingCredentials => AgriError::Unauthenticated,
            AuthError::TokenExpired => AgriError::TokenExpired,
            AuthError::TokenInvalid(reason) => AgriError::InvalidToken(reason),
            AuthError::Config(msg) => AgriError::Internal(msg),
            AuthError::Crypto(msg) => AgriError::Crypto(msg),
        }
    }
}
