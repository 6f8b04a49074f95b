use agri_integrations::ledger::DEFAULT_RECENT;
use agri_integrations::{ChainVerification, LedgerEntry, NewLedgerEntry};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::LimitQuery;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, CurrentTenant};
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/transactions", get(recent_entries).post(record_entry))
        .route("/verify", get(verify_chain))
}

async fn record_entry(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiJson(entry): ApiJson<NewLedgerEntry>,
) -> ApiResult<(StatusCode, Json<LedgerEntry>)> {
    let recorded = state.ledger.record(ctx.tenant_id(), entry)?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// Most recent entries, newest first.
async fn recent_entries(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> ApiResult<Json<Vec<LedgerEntry>>> {
    let limit = query.resolve(DEFAULT_RECENT)?;
    Ok(Json(state.ledger.recent(ctx.tenant_id(), limit)?))
}

async fn verify_chain(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
) -> ApiResult<Json<ChainVerification>> {
    Ok(Json(state.ledger.verify_chain(ctx.tenant_id())?))
}
