use agri_core::AgriError;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::error::ApiResult;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// 200 when the store answers a round trip, 503 otherwise.
pub async fn health_check(State(state): State<SharedState>) -> ApiResult<Json<HealthResponse>> {
    if let Err(e) = state.db.health().await {
        warn!(error = %e, "Health check failed");
        return Err(AgriError::Unavailable(e.to_string()).into());
    }
    Ok(Json(HealthResponse {
        status: "ok",
        message: "All services are running",
    }))
}
