//! Request extractors.

use agri_core::models::identity::TenantContext;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::SharedState;

/// The authenticated caller, resolved from the bearer token.
///
/// Rejects with 401 before any body is read.
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub TenantContext);

#[axum::async_trait]
impl FromRequestParts<SharedState> for CurrentTenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let ctx = state.auth.authenticate_header(header)?;
        Ok(CurrentTenant(ctx))
    }
}

/// JSON body whose rejections render as validation errors.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
