//! SurrealDB repository implementations.
//!
//! Every tenant-scoped statement binds `$tenant_id` and filters on it
//! next to the record id, so a row owned by another tenant is simply
//! absent from the result.

mod farmer;
mod order;
mod product;
mod tenant;

use surrealdb_types::SurrealValue;

pub use farmer::SurrealFarmerRepository;
pub use order::SurrealOrderRepository;
pub use product::SurrealProductRepository;
pub use tenant::SurrealTenantRepository;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

pub(crate) fn parse_uuid(entity: &str, raw: &str) -> Result<uuid::Uuid, crate::error::DbError> {
    uuid::Uuid::parse_str(raw)
        .map_err(|e| crate::error::DbError::Query(format!("invalid {entity} UUID: {e}")))
}
