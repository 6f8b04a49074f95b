use agri_core::models::order::{Order, PlaceOrder, UpdateOrderStatus};
use agri_core::repository::{OrderRepository, Pagination};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, patch};
use axum::{Json, Router};
use uuid::Uuid;

use super::{ListQuery, paged};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentTenant};
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_orders).post(place_order))
        .route("/:id", get(get_order))
        .route("/:id/status", patch(update_status))
}

async fn place_order(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiJson(input): ApiJson<PlaceOrder>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = state.marketplace.place_order(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Response> {
    let pagination = Pagination::from_query(query.limit, query.offset)?;
    let page = state
        .marketplace
        .orders()
        .list(ctx.tenant_id(), pagination)
        .await?;
    Ok(paged(page))
}

async fn get_order(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Order>> {
    let order = state
        .marketplace
        .orders()
        .get_by_id(ctx.tenant_id(), id)
        .await?;
    Ok(Json(order))
}

async fn update_status(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateOrderStatus>,
) -> ApiResult<Json<Order>> {
    let order = state
        .marketplace
        .update_order_status(&ctx, id, input.status)
        .await?;
    Ok(Json(order))
}
