//! SurrealDB implementation of [`FarmerRepository`].

use agri_core::error::AgriResult;
use agri_core::models::farmer::{CreateFarmer, Farmer, FarmerMetrics};
use agri_core::models::tenant::TenantId;
use agri_core::repository::{FarmerRepository, PaginatedResult, Pagination};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct FarmerRow {
    tenant_id: i64,
    name: String,
    location: String,
    esg_score: f64,
    total_sales: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FarmerRow {
    fn into_farmer(self, id: Uuid) -> Farmer {
        Farmer {
            id,
            tenant_id: self.tenant_id,
            name: self.name,
            location: self.location,
            esg_score: self.esg_score,
            total_sales: self.total_sales,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct FarmerRowWithId {
    record_id: String,
    tenant_id: i64,
    name: String,
    location: String,
    esg_score: f64,
    total_sales: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FarmerRowWithId {
    fn try_into_farmer(self) -> Result<Farmer, DbError> {
        let id = parse_uuid("farmer", &self.record_id)?;
        Ok(Farmer {
            id,
            tenant_id: self.tenant_id,
            name: self.name,
            location: self.location,
            esg_score: self.esg_score,
            total_sales: self.total_sales,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Farmer repository.
#[derive(Clone)]
pub struct SurrealFarmerRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealFarmerRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> FarmerRepository for SurrealFarmerRepository<C> {
    async fn create(&self, tenant_id: TenantId, input: CreateFarmer) -> AgriResult<Farmer> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('farmer', $id) SET \
                 tenant_id = $tenant_id, name = $name, location = $location",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id))
            .bind(("name", input.name))
            .bind(("location", input.location))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("Farmer", e))?;

        let rows: Vec<FarmerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Farmer".into(),
            id: id_str,
        })?;

        Ok(row.into_farmer(id))
    }

    async fn get_by_id(&self, tenant_id: TenantId, id: Uuid) -> AgriResult<Farmer> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('farmer', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FarmerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Farmer".into(),
            id: id_str,
        })?;

        Ok(row.into_farmer(id))
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        pagination: Pagination,
    ) -> AgriResult<PaginatedResult<Farmer>> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM farmer \
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
                "SELECT meta::id(id) AS record_id, * FROM farmer \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC, record_id ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FarmerRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_farmer())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update_metrics(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        metrics: FarmerMetrics,
    ) -> AgriResult<Farmer> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('farmer', $id) SET \
                 esg_score = $esg_score, total_sales = $total_sales, \
                 updated_at = time::now() \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id))
            .bind(("esg_score", metrics.esg_score))
            .bind(("total_sales", metrics.total_sales))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("Farmer", e))?;

        let rows: Vec<FarmerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Farmer".into(),
            id: id_str,
        })?;

        Ok(row.into_farmer(id))
    }
}
