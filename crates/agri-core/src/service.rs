//! Marketplace service: writes and reports that span more than one entity.
//!
//! Every lookup made on behalf of a caller is filtered by the caller's
//! tenant, including the foreign-key checks (product to farmer, order to
//! product). An entity owned by another tenant surfaces as `NotFound`.

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AgriError, AgriResult};
use crate::models::esg::{EsgAssessment, EsgReport, SalesLine};
use crate::models::farmer::{CreateFarmer, Farmer, FarmerMetrics};
use crate::models::identity::TenantContext;
use crate::models::order::{NewOrder, Order, OrderStatus, PlaceOrder};
use crate::models::product::{CreateProduct, Product};
use crate::repository::{FarmerRepository, OrderRepository, ProductRepository};

/// Turns a farmer's sales history into an ESG assessment.
pub trait EsgScorer: Send + Sync {
    fn assess(&self, sales: &[SalesLine]) -> EsgAssessment;
}

/// Marketplace orchestration.
///
/// Generic over repository implementations so that the service has no
/// dependency on the database crate.
pub struct MarketplaceService<F: FarmerRepository, P: ProductRepository, O: OrderRepository> {
    farmers: F,
    products: P,
    orders: O,
}

impl<F: FarmerRepository, P: ProductRepository, O: OrderRepository> MarketplaceService<F, P, O> {
    pub fn new(farmers: F, products: P, orders: O) -> Self {
        Self {
            farmers,
            products,
            orders,
        }
    }

    pub fn farmers(&self) -> &F {
        &self.farmers
    }

    pub fn products(&self) -> &P {
        &self.products
    }

    pub fn orders(&self) -> &O {
        &self.orders
    }

    pub async fn register_farmer(
        &self,
        ctx: &TenantContext,
        input: CreateFarmer,
    ) -> AgriResult<Farmer> {
        require_text("name", &input.name)?;
        require_text("location", &input.location)?;

        let farmer = self.farmers.create(ctx.tenant_id(), input).await?;
        info!(tenant_id = ctx.tenant_id(), farmer_id = %farmer.id, "farmer registered");
        Ok(farmer)
    }

    /// Create a product after resolving its farmer under the caller's tenant.
    pub async fn register_product(
        &self,
        ctx: &TenantContext,
        input: CreateProduct,
    ) -> AgriResult<Product> {
        require_text("name", &input.name)?;
        require_price(input.price)?;

        self.farmers
            .get_by_id(ctx.tenant_id(), input.farmer_id)
            .await?;

        let product = self.products.create(ctx.tenant_id(), input).await?;
        info!(tenant_id = ctx.tenant_id(), product_id = %product.id, "product registered");
        Ok(product)
    }

    pub async fn update_product_price(
        &self,
        ctx: &TenantContext,
        product_id: Uuid,
        price: f64,
    ) -> AgriResult<Product> {
        require_price(price)?;
        self.products
            .update_price(ctx.tenant_id(), product_id, price)
            .await
    }

    /// Place an order. The total is priced from the product as it is now
    /// and never recomputed afterwards.
    pub async fn place_order(&self, ctx: &TenantContext, input: PlaceOrder) -> AgriResult<Order> {
        if input.quantity <= 0 {
            return Err(AgriError::validation("quantity must be greater than 0"));
        }

        let product = self
            .products
            .get_by_id(ctx.tenant_id(), input.product_id)
            .await?;

        let total_price = product.price * input.quantity as f64;
        if !total_price.is_finite() {
            return Err(AgriError::validation("order total is out of range"));
        }

        let order = self
            .orders
            .create(
                ctx.tenant_id(),
                NewOrder {
                    product_id: product.id,
                    quantity: input.quantity,
                    total_price,
                    buyer_id: input.buyer_id,
                    status: OrderStatus::Pending,
                },
            )
            .await?;
        info!(
            tenant_id = ctx.tenant_id(),
            order_id = %order.id,
            total_price,
            "order placed"
        );
        Ok(order)
    }

    pub async fn update_order_status(
        &self,
        ctx: &TenantContext,
        order_id: Uuid,
        status: OrderStatus,
    ) -> AgriResult<Order> {
        let order = self
            .orders
            .update_status(ctx.tenant_id(), order_id, status)
            .await?;
        info!(tenant_id = ctx.tenant_id(), order_id = %order.id, status = %status, "order status updated");
        Ok(order)
    }

    /// Recompute a farmer's ESG report from their tenant-scoped sales and
    /// store the refreshed score and cumulative sales on the farmer.
    ///
    /// Cancelled orders do not count as sales.
    pub async fn esg_report<S: EsgScorer>(
        &self,
        ctx: &TenantContext,
        farmer_id: Uuid,
        scorer: &S,
    ) -> AgriResult<EsgReport> {
        let tenant_id = ctx.tenant_id();
        let farmer = self.farmers.get_by_id(tenant_id, farmer_id).await?;

        let product_ids: Vec<Uuid> = self
            .products
            .list_by_farmer(tenant_id, farmer_id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let orders: Vec<Order> = if product_ids.is_empty() {
            Vec::new()
        } else {
            self.orders
                .list_by_products(tenant_id, &product_ids)
                .await?
                .into_iter()
                .filter(|o| o.status != OrderStatus::Cancelled)
                .collect()
        };

        let sales: Vec<SalesLine> = orders
            .iter()
            .map(|o| SalesLine {
                product_id: o.product_id,
                quantity: o.quantity,
            })
            .collect();
        let total_sales: f64 = orders.iter().map(|o| o.total_price).sum();

        let assessment = scorer.assess(&sales);
        debug!(
            tenant_id,
            farmer_id = %farmer_id,
            lines = sales.len(),
            esg_score = assessment.esg_score,
            "esg assessed"
        );

        let farmer = self
            .farmers
            .update_metrics(
                tenant_id,
                farmer.id,
                FarmerMetrics {
                    esg_score: assessment.esg_score,
                    total_sales,
                },
            )
            .await?;

        Ok(EsgReport {
            farmer_id: farmer.id,
            farmer_name: farmer.name,
            esg_score: farmer.esg_score,
            total_sales: farmer.total_sales,
            social_impact: assessment.social_impact,
            environmental_impact: assessment.environmental_impact,
        })
    }
}

fn require_text(field: &str, value: &str) -> AgriResult<()> {
    if value.trim().is_empty() {
        return Err(AgriError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_price(price: f64) -> AgriResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AgriError::validation(
            "price must be a finite, non-negative number",
        ));
    }
    Ok(())
}
