//! In-process collaborators for AgriBridge: payments, the hash-chained
//! ledger, IoT telemetry, LINE messaging and ESG scoring.
//!
//! Every stateful collaborator keeps its data in an injected
//! [`TenantStore`] keyed by tenant id.

pub mod error;
pub mod esg;
pub mod ledger;
pub mod messaging;
pub mod payments;
pub mod store;
pub mod telemetry;

pub use error::IntegrationError;
pub use esg::EsgCalculator;
pub use ledger::{BlockchainLedger, ChainVerification, LedgerEntry, NewLedgerEntry};
pub use messaging::{LineConfig, LineMessenger, LineReply, PushedMessage};
pub use payments::{PaymentGateway, PaymentKeys, PaymentReceipt, PaymentRequest};
pub use store::{InMemoryTenantStore, TenantStore};
pub use telemetry::{IncomingReading, SensorReading, TelemetryStore};
