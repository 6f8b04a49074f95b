use agri_core::repository::Pagination;
use agri_integrations::{PaymentReceipt, PaymentRequest};
use axum::extract::State;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{ListQuery, paged};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, CurrentTenant};
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/payments", post(process_payment))
        .route("/ledger/transactions", get(list_transactions))
}

async fn process_payment(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiJson(request): ApiJson<PaymentRequest>,
) -> ApiResult<Json<PaymentReceipt>> {
    let receipt = state.payments.process(ctx.tenant_id(), request)?;
    Ok(Json(receipt))
}

async fn list_transactions(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Response> {
    let pagination = Pagination::from_query(query.limit, query.offset)?;
    let page = state.payments.transactions(ctx.tenant_id(), pagination)?;
    Ok(paged(page))
}
