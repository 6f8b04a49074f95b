//! Farmer domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tenant::TenantId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Farmer {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub name: String,
    pub location: String,
    /// Last computed ESG score (0..=100).
    pub esg_score: f64,
    /// Cumulative sales value at the time of the last ESG refresh.
    pub total_sales: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when registering a farmer. The owning tenant is never
/// part of the payload; it comes from the caller's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFarmer {
    pub name: String,
    pub location: String,
}

/// Derived metrics written back after an ESG refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarmerMetrics {
    pub esg_score: f64,
    pub total_sales: f64,
}
