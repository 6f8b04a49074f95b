//! SurrealDB implementation of [`OrderRepository`].
//!
//! Orders live in the `sales_order` table.

use agri_core::error::AgriResult;
use agri_core::models::order::{NewOrder, Order, OrderStatus};
use agri_core::models::tenant::TenantId;
use agri_core::repository::{OrderRepository, PaginatedResult, Pagination};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

fn parse_status(s: &str) -> Result<OrderStatus, DbError> {
    s.parse()
        .map_err(|_| DbError::Query(format!("unknown order status: {s}")))
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct OrderRow {
    tenant_id: i64,
    product_id: String,
    quantity: i64,
    total_price: f64,
    buyer_id: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, id: Uuid) -> Result<Order, DbError> {
        Ok(Order {
            id,
            tenant_id: self.tenant_id,
            product_id: parse_uuid("product", &self.product_id)?,
            quantity: self.quantity,
            total_price: self.total_price,
            buyer_id: self.buyer_id,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrderRowWithId {
    record_id: String,
    tenant_id: i64,
    product_id: String,
    quantity: i64,
    total_price: f64,
    buyer_id: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRowWithId {
    fn try_into_order(self) -> Result<Order, DbError> {
        let id = parse_uuid("order", &self.record_id)?;
        OrderRow {
            tenant_id: self.tenant_id,
            product_id: self.product_id,
            quantity: self.quantity,
            total_price: self.total_price,
            buyer_id: self.buyer_id,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_order(id)
    }
}

/// SurrealDB implementation of the Order repository.
#[derive(Clone)]
pub struct SurrealOrderRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrderRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrderRepository for SurrealOrderRepository<C> {
    async fn create(&self, tenant_id: TenantId, input: NewOrder) -> AgriResult<Order> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('sales_order', $id) SET \
                 tenant_id = $tenant_id, product_id = $product_id, \
                 quantity = $quantity, total_price = $total_price, \
                 buyer_id = $buyer_id, status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id))
            .bind(("product_id", input.product_id.to_string()))
            .bind(("quantity", input.quantity))
            .bind(("total_price", input.total_price))
            .bind(("buyer_id", input.buyer_id))
            .bind(("status", input.status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("Order", e))?;

        let rows: Vec<OrderRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Order".into(),
            id: id_str,
        })?;

        Ok(row.into_order(id)?)
    }

    async fn get_by_id(&self, tenant_id: TenantId, id: Uuid) -> AgriResult<Order> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('sales_order', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrderRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Order".into(),
            id: id_str,
        })?;

        Ok(row.into_order(id)?)
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        pagination: Pagination,
    ) -> AgriResult<PaginatedResult<Order>> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM sales_order \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM sales_order \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC, record_id ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrderRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_order())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_by_products(
        &self,
        tenant_id: TenantId,
        product_ids: &[Uuid],
    ) -> AgriResult<Vec<Order>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = product_ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM sales_order \
                 WHERE tenant_id = $tenant_id AND product_id IN $product_ids \
                 ORDER BY created_at ASC, record_id ASC",
            )
            .bind(("tenant_id", tenant_id))
            .bind(("product_ids", ids))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrderRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_order())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn update_status(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        status: OrderStatus,
    ) -> AgriResult<Order> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('sales_order', $id) SET \
                 status = $status, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id))
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("Order", e))?;

        let rows: Vec<OrderRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Order".into(),
            id: id_str,
        })?;

        Ok(row.into_order(id)?)
    }
}
