//! SurrealDB implementation of [`TenantRepository`].

use agri_core::error::AgriResult;
use agri_core::models::tenant::{CreateTenant, Tenant, TenantId};
use agri_core::repository::{PaginatedResult, Pagination, TenantRepository};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use super::CountRow;
use crate::error::DbError;

/// DB-side row struct for queries where the id is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    name: String,
    created_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self, id: TenantId) -> Tenant {
        Tenant {
            id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> AgriResult<Tenant> {
        let result = self
            .db
            .query("CREATE type::record('tenant', $id) SET name = $name")
            .bind(("id", input.id))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("Tenant", e))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Tenant".into(),
            id: input.id.to_string(),
        })?;

        Ok(row.into_tenant(input.id))
    }

    async fn get_by_id(&self, id: TenantId) -> AgriResult<Tenant> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Tenant".into(),
            id: id.to_string(),
        })?;

        Ok(row.into_tenant(id))
    }

    async fn list(&self, pagination: Pagination) -> AgriResult<PaginatedResult<Tenant>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM tenant GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 ORDER BY record_id ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| Tenant {
                id: row.record_id,
                name: row.name,
                created_at: row.created_at,
            })
            .collect();

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
