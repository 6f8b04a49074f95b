//! HTTP error mapping and startup errors.

use agri_auth::AuthError;
use agri_core::AgriError;
use agri_db::DbError;
use agri_integrations::IntegrationError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub detail: String,
}

/// A request failure, rendered as `{"code", "detail"}` with the status
/// that matches the underlying [`AgriError`].
#[derive(Debug)]
pub struct ApiError(AgriError);

impl ApiError {
    pub fn inner(&self) -> &AgriError {
        &self.0
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AgriError::Unauthenticated
            | AgriError::InvalidCredentials
            | AgriError::InvalidToken(_)
            | AgriError::TokenExpired => StatusCode::UNAUTHORIZED,
            AgriError::NotFound { .. } | AgriError::NoData(_) => StatusCode::NOT_FOUND,
            AgriError::Conflict { .. } => StatusCode::CONFLICT,
            AgriError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AgriError::UnsupportedOperation(_) | AgriError::InvalidSignature => {
                StatusCode::BAD_REQUEST
            }
            AgriError::Unavailable(_) | AgriError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            AgriError::Crypto(_) | AgriError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match &self.0 {
            AgriError::Unauthenticated => "unauthenticated",
            AgriError::InvalidCredentials => "invalid_credentials",
            AgriError::InvalidToken(_) => "invalid_token",
            AgriError::TokenExpired => "token_expired",
            AgriError::NotFound { .. } | AgriError::NoData(_) => "not_found",
            AgriError::Conflict { .. } => "conflict",
            AgriError::Validation { .. } => "validation_error",
            AgriError::UnsupportedOperation(_) => "unsupported_operation",
            AgriError::InvalidSignature => "invalid_signature",
            AgriError::Unavailable(_) => "service_unavailable",
            AgriError::Database(_) => "database_error",
            AgriError::Crypto(_) | AgriError::Internal(_) => "internal_error",
        }
    }

    fn detail(&self) -> String {
        match &self.0 {
            AgriError::Validation { message } => message.clone(),
            AgriError::Database(_) => "Database unavailable".to_string(),
            AgriError::Crypto(_) | AgriError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, status = status.as_u16(), "Request failed");
        }

        let body = ErrorBody {
            code: self.code(),
            detail: self.detail(),
        };
        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AgriError> for ApiError {
    fn from(err: AgriError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self(err.into())
    }
}

impl From<IntegrationError> for ApiError {
    fn from(err: IntegrationError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AgriError::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AgriError::validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(AgriError::validation(rejection.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Failures that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database: {0}")]
    Database(#[from] DbError),

    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    #[error("seeding demo data: {0}")]
    Seed(#[from] AgriError),

    #[error("integrations: {0}")]
    Integration(#[from] IntegrationError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
