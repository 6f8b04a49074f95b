//! SurrealDB implementation of [`ProductRepository`].

use agri_core::error::AgriResult;
use agri_core::models::product::{CreateProduct, Product};
use agri_core::models::tenant::TenantId;
use agri_core::repository::{PaginatedResult, Pagination, ProductRepository};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ProductRow {
    tenant_id: i64,
    name: String,
    price: f64,
    farmer_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, id: Uuid) -> Result<Product, DbError> {
        Ok(Product {
            id,
            tenant_id: self.tenant_id,
            name: self.name,
            price: self.price,
            farmer_id: parse_uuid("farmer", &self.farmer_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ProductRowWithId {
    record_id: String,
    tenant_id: i64,
    name: String,
    price: f64,
    farmer_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRowWithId {
    fn try_into_product(self) -> Result<Product, DbError> {
        Ok(Product {
            id: parse_uuid("product", &self.record_id)?,
            tenant_id: self.tenant_id,
            name: self.name,
            price: self.price,
            farmer_id: parse_uuid("farmer", &self.farmer_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Product repository.
#[derive(Clone)]
pub struct SurrealProductRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProductRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProductRepository for SurrealProductRepository<C> {
    async fn create(&self, tenant_id: TenantId, input: CreateProduct) -> AgriResult<Product> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('product', $id) SET \
                 tenant_id = $tenant_id, name = $name, price = $price, \
                 farmer_id = $farmer_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id))
            .bind(("name", input.name))
            .bind(("price", input.price))
            .bind(("farmer_id", input.farmer_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("Product", e))?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Product".into(),
            id: id_str,
        })?;

        Ok(row.into_product(id)?)
    }

    async fn get_by_id(&self, tenant_id: TenantId, id: Uuid) -> AgriResult<Product> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('product', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Product".into(),
            id: id_str,
        })?;

        Ok(row.into_product(id)?)
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        pagination: Pagination,
    ) -> AgriResult<PaginatedResult<Product>> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM product \
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
                "SELECT meta::id(id) AS record_id, * FROM product \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC, record_id ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProductRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_product())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_by_farmer(&self, tenant_id: TenantId, farmer_id: Uuid) -> AgriResult<Vec<Product>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM product \
                 WHERE tenant_id = $tenant_id AND farmer_id = $farmer_id \
                 ORDER BY created_at ASC, record_id ASC",
            )
            .bind(("tenant_id", tenant_id))
            .bind(("farmer_id", farmer_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProductRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_product())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn update_price(&self, tenant_id: TenantId, id: Uuid, price: f64) -> AgriResult<Product> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('product', $id) SET \
                 price = $price, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id))
            .bind(("price", price))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("Product", e))?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Product".into(),
            id: id_str,
        })?;

        Ok(row.into_product(id)?)
    }
}
