use agri_integrations::telemetry::DEFAULT_READINGS;
use agri_integrations::{IncomingReading, SensorReading};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use super::LimitQuery;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentTenant};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub message: &'static str,
    pub data: SensorReading,
}

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/data", post(ingest))
        .route("/data/:device_id", get(readings))
}

async fn ingest(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiJson(reading): ApiJson<IncomingReading>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    let data = state.telemetry.ingest(ctx.tenant_id(), reading)?;
    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            message: "IoT data received successfully",
            data,
        }),
    ))
}

async fn readings(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiPath(device_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> ApiResult<Json<Vec<SensorReading>>> {
    let limit = query.resolve(DEFAULT_READINGS)?;
    let readings = state
        .telemetry
        .readings(ctx.tenant_id(), &device_id, limit)?;
    Ok(Json(readings))
}
