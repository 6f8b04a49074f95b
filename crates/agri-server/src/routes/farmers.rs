use agri_core::models::esg::EsgReport;
use agri_core::models::farmer::{CreateFarmer, Farmer};
use agri_core::repository::{FarmerRepository, Pagination};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use super::{ListQuery, paged};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentTenant};
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_farmers).post(create_farmer))
        .route("/:id", get(get_farmer))
        .route("/:id/esg-report", get(esg_report))
}

async fn create_farmer(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiJson(input): ApiJson<CreateFarmer>,
) -> ApiResult<(StatusCode, Json<Farmer>)> {
    let farmer = state.marketplace.register_farmer(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(farmer)))
}

async fn list_farmers(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Response> {
    let pagination = Pagination::from_query(query.limit, query.offset)?;
    let page = state
        .marketplace
        .farmers()
        .list(ctx.tenant_id(), pagination)
        .await?;
    Ok(paged(page))
}

async fn get_farmer(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Farmer>> {
    let farmer = state
        .marketplace
        .farmers()
        .get_by_id(ctx.tenant_id(), id)
        .await?;
    Ok(Json(farmer))
}

/// Recompute and persist the farmer's ESG metrics.
async fn esg_report(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<EsgReport>> {
    let report = state.marketplace.esg_report(&ctx, id, &state.esg).await?;
    Ok(Json(report))
}
