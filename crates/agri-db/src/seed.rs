//! Demo data provisioning.
//!
//! Creates the default tenant with one farmer, three products and two
//! orders. Skipped entirely when the default tenant already exists, so
//! running it on every start is safe.

use agri_core::error::{AgriError, AgriResult};
use agri_core::models::farmer::{CreateFarmer, FarmerMetrics};
use agri_core::models::order::{NewOrder, OrderStatus};
use agri_core::models::product::CreateProduct;
use agri_core::models::tenant::{CreateTenant, TenantId};
use agri_core::repository::{
    FarmerRepository, OrderRepository, ProductRepository, TenantRepository,
};
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::repository::{
    SurrealFarmerRepository, SurrealOrderRepository, SurrealProductRepository,
    SurrealTenantRepository,
};

pub const DEFAULT_TENANT_ID: TenantId = 1;
pub const DEFAULT_TENANT_NAME: &str = "AgriBridge Default Tenant";

/// Whether [`seed_demo_data`] wrote anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyPresent,
}

pub async fn seed_demo_data<C: Connection>(db: &Surreal<C>) -> AgriResult<SeedOutcome> {
    let tenants = SurrealTenantRepository::new(db.clone());
    match tenants.get_by_id(DEFAULT_TENANT_ID).await {
        Ok(_) => {
            info!(tenant_id = DEFAULT_TENANT_ID, "Demo data already present");
            return Ok(SeedOutcome::AlreadyPresent);
        }
        Err(AgriError::NotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    tenants
        .create(CreateTenant {
            id: DEFAULT_TENANT_ID,
            name: DEFAULT_TENANT_NAME.into(),
        })
        .await?;

    let farmers = SurrealFarmerRepository::new(db.clone());
    let farmer = farmers
        .create(
            DEFAULT_TENANT_ID,
            CreateFarmer {
                name: "AgriBridge Demo Farm".into(),
                location: "Taiwan".into(),
            },
        )
        .await?;
    farmers
        .update_metrics(
            DEFAULT_TENANT_ID,
            farmer.id,
            FarmerMetrics {
                esg_score: 75.5,
                total_sales: 5000.0,
            },
        )
        .await?;

    let products = SurrealProductRepository::new(db.clone());
    let mut catalog = Vec::new();
    for (name, price) in [
        ("有機蔬菜包", 120.0),
        ("高山水果禮盒", 500.0),
        ("新鮮雞蛋 (10入)", 80.0),
    ] {
        let product = products
            .create(
                DEFAULT_TENANT_ID,
                CreateProduct {
                    name: name.into(),
                    price,
                    farmer_id: farmer.id,
                },
            )
            .await?;
        catalog.push(product);
    }

    let orders = SurrealOrderRepository::new(db.clone());
    for (product, quantity, buyer_id, status) in [
        (&catalog[0], 2, 101, OrderStatus::Completed),
        (&catalog[1], 1, 102, OrderStatus::Pending),
    ] {
        orders
            .create(
                DEFAULT_TENANT_ID,
                NewOrder {
                    product_id: product.id,
                    quantity,
                    total_price: product.price * quantity as f64,
                    buyer_id,
                    status,
                },
            )
            .await?;
    }

    info!(
        tenant_id = DEFAULT_TENANT_ID,
        farmer_id = %farmer.id,
        products = catalog.len(),
        "Demo data created"
    );
    Ok(SeedOutcome::Created)
}
