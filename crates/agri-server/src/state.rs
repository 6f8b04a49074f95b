//! Shared application state.

use std::sync::Arc;

use agri_auth::{AuthService, StaticCredentialStore};
use agri_core::service::MarketplaceService;
use agri_db::{
    DEFAULT_TENANT_ID, DbManager, SeedOutcome, SurrealFarmerRepository, SurrealOrderRepository,
    SurrealProductRepository, run_migrations, seed_demo_data,
};
use agri_integrations::{
    BlockchainLedger, EsgCalculator, InMemoryTenantStore, LineMessenger, PaymentGateway,
    TelemetryStore, TenantStore,
};
use surrealdb::engine::any::Any;
use tracing::info;

use crate::config::AppConfig;
use crate::error::ServerError;

/// Device that receives a synthetic reading series with the demo data.
pub const DEMO_DEVICE_ID: &str = "demo-sensor-01";
const DEMO_SERIES_POINTS: usize = 20;

pub type Marketplace = MarketplaceService<
    SurrealFarmerRepository<Any>,
    SurrealProductRepository<Any>,
    SurrealOrderRepository<Any>,
>;

pub struct AppState {
    pub auth: AuthService<StaticCredentialStore>,
    pub marketplace: Marketplace,
    pub db: DbManager,
    pub payments: PaymentGateway,
    pub ledger: BlockchainLedger,
    pub telemetry: TelemetryStore,
    pub line: LineMessenger,
    pub esg: EsgCalculator,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Connect the store, apply migrations, optionally seed demo data and
    /// wire every service.
    pub async fn initialize(config: &AppConfig) -> Result<SharedState, ServerError> {
        let db = DbManager::connect(&config.database).await?;
        run_migrations(db.client()).await?;

        let seeded = if config.seed_demo_data {
            seed_demo_data(db.client()).await? == SeedOutcome::Created
        } else {
            false
        };

        let credentials = StaticCredentialStore::from_plaintext(
            config.auth.login_username.clone(),
            &config.auth.login_password,
            config.auth.login_tenant_id,
        )?;
        let auth = AuthService::new(credentials, config.auth.clone())?;

        let client = db.client().clone();
        let marketplace = MarketplaceService::new(
            SurrealFarmerRepository::new(client.clone()),
            SurrealProductRepository::new(client.clone()),
            SurrealOrderRepository::new(client),
        );

        let store: Arc<dyn TenantStore> = Arc::new(InMemoryTenantStore::new());
        let telemetry = TelemetryStore::new(store.clone());
        if seeded {
            let points = telemetry.seed_demo_series(
                DEFAULT_TENANT_ID,
                DEMO_DEVICE_ID,
                DEMO_SERIES_POINTS,
            )?;
            info!(device_id = DEMO_DEVICE_ID, points, "Demo telemetry seeded");
        }

        Ok(Arc::new(Self {
            auth,
            marketplace,
            db,
            payments: PaymentGateway::new(store.clone(), config.integrations.payments.clone()),
            ledger: BlockchainLedger::new(store.clone()),
            telemetry,
            line: LineMessenger::new(store, &config.integrations.line),
            esg: EsgCalculator::new(),
        }))
    }
}
