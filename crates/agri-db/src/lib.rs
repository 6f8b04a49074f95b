//! AgriBridge Database: SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Tenant-scoped repositories for farmers, products and orders
//! - Demo data provisioning ([`seed_demo_data`])
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;
mod seed;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::{
    SurrealFarmerRepository, SurrealOrderRepository, SurrealProductRepository,
    SurrealTenantRepository,
};
pub use schema::{run_migrations, schema_v1};
pub use seed::{DEFAULT_TENANT_ID, DEFAULT_TENANT_NAME, SeedOutcome, seed_demo_data};
