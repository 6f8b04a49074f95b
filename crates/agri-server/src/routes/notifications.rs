use agri_integrations::messaging::SIGNATURE_HEADER;
use agri_integrations::LineReply;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, CurrentTenant};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct LineMessageRequest {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LineMessageResponse {
    pub message: &'static str,
    pub message_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub replies: Vec<LineReply>,
}

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/notifications/send-line-message", post(send_line_message))
        .route("/line-webhook", post(line_webhook))
}

async fn send_line_message(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiJson(request): ApiJson<LineMessageRequest>,
) -> ApiResult<Json<LineMessageResponse>> {
    let pushed = state
        .line
        .send(ctx.tenant_id(), &request.user_id, &request.message)?;
    Ok(Json(LineMessageResponse {
        message: "LINE notification sent successfully",
        message_id: pushed.id,
    }))
}

/// Authenticated by the body signature, not a bearer token.
async fn line_webhook(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let replies = state.line.handle_webhook(&body, signature)?;
    Ok(Json(WebhookResponse {
        status: "ok",
        replies,
    }))
}
