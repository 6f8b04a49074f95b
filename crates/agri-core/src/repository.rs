//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories take
//! the caller's `tenant_id` as an explicit argument on every read and
//! write, and implementations must filter on it jointly with the primary
//! key. A row owned by another tenant is reported as `NotFound`.

use uuid::Uuid;

use crate::error::{AgriError, AgriResult};
use crate::models::{
    farmer::{CreateFarmer, Farmer, FarmerMetrics},
    order::{NewOrder, Order, OrderStatus},
    product::{CreateProduct, Product},
    tenant::{CreateTenant, Tenant, TenantId},
};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Upper bound on any requested page size.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Build pagination from optional, untrusted query values.
    ///
    /// Negative values are rejected; an oversized limit is clamped to
    /// [`MAX_PAGE_SIZE`].
    pub fn from_query(limit: Option<i64>, offset: Option<i64>) -> AgriResult<Self> {
        let limit = match limit {
            None => DEFAULT_PAGE_SIZE,
            Some(l) if l < 0 => {
                return Err(AgriError::validation("limit must be a non-negative integer"));
            }
            Some(l) => (l as u64).min(MAX_PAGE_SIZE),
        };
        let offset = match offset {
            None => 0,
            Some(o) if o < 0 => {
                return Err(AgriError::validation(
                    "offset must be a non-negative integer",
                ));
            }
            Some(o) => o as u64,
        };
        Ok(Self { offset, limit })
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenant (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    /// Provision a tenant. Fails with `Conflict` if the id or name is taken.
    fn create(&self, input: CreateTenant) -> impl Future<Output = AgriResult<Tenant>> + Send;
    fn get_by_id(&self, id: TenantId) -> impl Future<Output = AgriResult<Tenant>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = AgriResult<PaginatedResult<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped repositories
// ---------------------------------------------------------------------------

pub trait FarmerRepository: Send + Sync {
    fn create(
        &self,
        tenant_id: TenantId,
        input: CreateFarmer,
    ) -> impl Future<Output = AgriResult<Farmer>> + Send;
    fn get_by_id(
        &self,
        tenant_id: TenantId,
        id: Uuid,
    ) -> impl Future<Output = AgriResult<Farmer>> + Send;
    fn list(
        &self,
        tenant_id: TenantId,
        pagination: Pagination,
    ) -> impl Future<Output = AgriResult<PaginatedResult<Farmer>>> + Send;
    /// Overwrite the derived ESG score and cumulative sales.
    fn update_metrics(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        metrics: FarmerMetrics,
    ) -> impl Future<Output = AgriResult<Farmer>> + Send;
}

pub trait ProductRepository: Send + Sync {
    fn create(
        &self,
        tenant_id: TenantId,
        input: CreateProduct,
    ) -> impl Future<Output = AgriResult<Product>> + Send;
    fn get_by_id(
        &self,
        tenant_id: TenantId,
        id: Uuid,
    ) -> impl Future<Output = AgriResult<Product>> + Send;
    fn list(
        &self,
        tenant_id: TenantId,
        pagination: Pagination,
    ) -> impl Future<Output = AgriResult<PaginatedResult<Product>>> + Send;
    /// All products offered by one farmer of the tenant.
    fn list_by_farmer(
        &self,
        tenant_id: TenantId,
        farmer_id: Uuid,
    ) -> impl Future<Output = AgriResult<Vec<Product>>> + Send;
    fn update_price(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        price: f64,
    ) -> impl Future<Output = AgriResult<Product>> + Send;
}

pub trait OrderRepository: Send + Sync {
    fn create(
        &self,
        tenant_id: TenantId,
        input: NewOrder,
    ) -> impl Future<Output = AgriResult<Order>> + Send;
    fn get_by_id(
        &self,
        tenant_id: TenantId,
        id: Uuid,
    ) -> impl Future<Output = AgriResult<Order>> + Send;
    fn list(
        &self,
        tenant_id: TenantId,
        pagination: Pagination,
    ) -> impl Future<Output = AgriResult<PaginatedResult<Order>>> + Send;
    /// All orders of the tenant that reference one of `product_ids`.
    fn list_by_products(
        &self,
        tenant_id: TenantId,
        product_ids: &[Uuid],
    ) -> impl Future<Output = AgriResult<Vec<Order>>> + Send;
    fn update_status(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        status: OrderStatus,
    ) -> impl Future<Output = AgriResult<Order>> + Send;
}
