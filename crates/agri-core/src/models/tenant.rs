//! Tenant domain model.
//!
//! Tenants are the isolation boundary of the marketplace. Every farmer,
//! product and order row is owned by exactly one tenant, and every
//! tenant-scoped query is filtered by the caller's tenant id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tenant identifiers are small integers assigned at provisioning time.
/// They travel inside access tokens as the `tenant_id` claim.
pub type TenantId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tenant {
    pub id: TenantId,
    /// Display name, unique across tenants.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to provision a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub id: TenantId,
    pub name: String,
}
