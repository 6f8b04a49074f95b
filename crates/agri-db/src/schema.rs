//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. Entity UUIDs are stored as
//! string record ids, tenant ids as plain integers. Enums are stored as
//! strings with ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope, integer record ids)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_name ON TABLE tenant COLUMNS name UNIQUE;

-- =======================================================================
-- Farmers (tenant scope)
-- =======================================================================
DEFINE TABLE farmer SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE farmer TYPE int;
DEFINE FIELD name ON TABLE farmer TYPE string;
DEFINE FIELD location ON TABLE farmer TYPE string;
DEFINE FIELD esg_score ON TABLE farmer TYPE float DEFAULT 0.0;
DEFINE FIELD total_sales ON TABLE farmer TYPE float DEFAULT 0.0;
DEFINE FIELD created_at ON TABLE farmer TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE farmer TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_farmer_tenant ON TABLE farmer \
    COLUMNS tenant_id, created_at;

-- =======================================================================
-- Products (tenant scope, owned by a farmer of the same tenant)
-- =======================================================================
DEFINE TABLE product SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE product TYPE int;
DEFINE FIELD name ON TABLE product TYPE string;
DEFINE FIELD price ON TABLE product TYPE float ASSERT $value >= 0;
DEFINE FIELD farmer_id ON TABLE product TYPE string;
DEFINE FIELD created_at ON TABLE product TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE product TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_product_tenant ON TABLE product \
    COLUMNS tenant_id, created_at;
DEFINE INDEX idx_product_tenant_farmer ON TABLE product \
    COLUMNS tenant_id, farmer_id;

-- =======================================================================
-- Orders (tenant scope, reference a product of the same tenant)
-- =======================================================================
DEFINE TABLE sales_order SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE sales_order TYPE int;
DEFINE FIELD product_id ON TABLE sales_order TYPE string;
DEFINE FIELD quantity ON TABLE sales_order TYPE int ASSERT $value > 0;
DEFINE FIELD total_price ON TABLE sales_order TYPE float;
DEFINE FIELD buyer_id ON TABLE sales_order TYPE int;
DEFINE FIELD status ON TABLE sales_order TYPE string \
    ASSERT $value IN ['pending', 'completed', 'cancelled'];
DEFINE FIELD created_at ON TABLE sales_order TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE sales_order TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_sales_order_tenant ON TABLE sales_order \
    COLUMNS tenant_id, created_at;
DEFINE INDEX idx_sales_order_tenant_product ON TABLE sales_order \
    COLUMNS tenant_id, product_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn tenant_scoped_tables_carry_integer_tenant_id() {
        for table in ["farmer", "product", "sales_order"] {
            let field = format!("DEFINE FIELD tenant_id ON TABLE {table} TYPE int;");
            assert!(SCHEMA_V1.contains(&field), "{table} lacks tenant_id");
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
