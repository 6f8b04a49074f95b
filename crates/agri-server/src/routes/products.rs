use agri_core::models::product::{CreateProduct, Product, UpdateProductPrice};
use agri_core::repository::{Pagination, ProductRepository};
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
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).patch(update_price))
}

async fn create_product(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiJson(input): ApiJson<CreateProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.marketplace.register_product(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn list_products(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Response> {
    let pagination = Pagination::from_query(query.limit, query.offset)?;
    let page = state
        .marketplace
        .products()
        .list(ctx.tenant_id(), pagination)
        .await?;
    Ok(paged(page))
}

async fn get_product(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Product>> {
    let product = state
        .marketplace
        .products()
        .get_by_id(ctx.tenant_id(), id)
        .await?;
    Ok(Json(product))
}

async fn update_price(
    State(state): State<SharedState>,
    CurrentTenant(ctx): CurrentTenant,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateProductPrice>,
) -> ApiResult<Json<Product>> {
    let product = state
        .marketplace
        .update_product_price(&ctx, id, input.price)
        .await?;
    Ok(Json(product))
}
