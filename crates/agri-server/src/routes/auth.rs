use agri_auth::LoginInput;
use agri_core::models::identity::TenantContext;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extract::{ApiJson, CurrentTenant};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/login", post(login))
        .route("/protected", get(protected))
}

async fn login(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let output = state
        .auth
        .login(LoginInput {
            username: input.username,
            password: input.password,
        })
        .await?;
    Ok(Json(TokenResponse {
        access_token: output.access_token,
        token_type: output.token_type,
        expires_in: output.expires_in,
    }))
}

/// Echo the caller's identity.
async fn protected(CurrentTenant(ctx): CurrentTenant) -> Json<TenantContext> {
    Json(ctx)
}
