//! Simulated payment gateway.
//!
//! Stripe and NewebPay requests always succeed; no network call is made.
//! Every processed payment is kept as a receipt in the tenant's ledger.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use agri_core::models::tenant::TenantId;
use agri_core::repository::{PaginatedResult, Pagination};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::IntegrationError;
use crate::store::{self, TenantStore};

const RECEIPTS_KEY: &str = "payments:receipts";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Stripe,
    Newebpay,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::Newebpay => "newebpay",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = IntegrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stripe" => Ok(PaymentMethod::Stripe),
            "newebpay" => Ok(PaymentMethod::Newebpay),
            other => Err(IntegrationError::UnsupportedPaymentMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
}

/// Payment request as submitted by a client. The method stays a plain
/// string here so an unknown method is reported as unsupported rather
/// than as a malformed body.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub order_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentReceipt {
    pub transaction_id: Uuid,
    pub status: PaymentStatus,
    pub amount: f64,
    pub currency: String,
    pub order_id: Uuid,
    pub payment_method: PaymentMethod,
    pub processed_at: DateTime<Utc>,
}

/// Gateway API keys. Unset keys and keys containing `mock` put the
/// corresponding method in simulation mode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentKeys {
    pub stripe_api_key: Option<String>,
    pub newebpay_api_key: Option<String>,
}

impl PaymentKeys {
    fn key_for(&self, method: PaymentMethod) -> Option<&str> {
        match method {
            PaymentMethod::Stripe => self.stripe_api_key.as_deref(),
            PaymentMethod::Newebpay => self.newebpay_api_key.as_deref(),
        }
    }

    pub fn is_simulated(&self, method: PaymentMethod) -> bool {
        self.key_for(method).is_none_or(|k| k.contains("mock"))
    }

    /// Methods running without a real key, for startup diagnostics.
    pub fn simulated_methods(&self) -> Vec<PaymentMethod> {
        [PaymentMethod::Stripe, PaymentMethod::Newebpay]
            .into_iter()
            .filter(|m| self.is_simulated(*m))
            .collect()
    }
}

/// Receipts kept per tenant; older ones are dropped first.
pub const MAX_RECEIPTS_PER_TENANT: usize = 10_000;

pub struct PaymentGateway {
    store: Arc<dyn TenantStore>,
    keys: PaymentKeys,
    retention: usize,
}

impl PaymentGateway {
    pub fn new(store: Arc<dyn TenantStore>, keys: PaymentKeys) -> Self {
        Self {
            store,
            keys,
            retention: MAX_RECEIPTS_PER_TENANT,
        }
    }

    /// Keep at most `retention` receipts per tenant.
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention.max(1);
        self
    }

    pub fn process(
        &self,
        tenant_id: TenantId,
        request: PaymentRequest,
    ) -> Result<PaymentReceipt, IntegrationError> {
        let method: PaymentMethod = request.payment_method.parse()?;

        if !request.amount.is_finite() || request.amount <= 0.0 {
            return Err(IntegrationError::InvalidInput(
                "amount must be greater than 0".into(),
            ));
        }
        let currency = request.currency.trim().to_ascii_uppercase();
        if currency.is_empty() {
            return Err(IntegrationError::InvalidInput(
                "currency must not be empty".into(),
            ));
        }

        if self.keys.is_simulated(method) {
            debug!(%method, "No live API key, simulating gateway success");
        }

        let receipt = PaymentReceipt {
            transaction_id: Uuid::new_v4(),
            status: PaymentStatus::Completed,
            amount: request.amount,
            currency,
            order_id: request.order_id,
            payment_method: method,
            processed_at: Utc::now(),
        };

        store::modify(
            self.store.as_ref(),
            tenant_id,
            RECEIPTS_KEY,
            |receipts: &mut Vec<PaymentReceipt>| {
                receipts.push(receipt.clone());
                store::retain_latest(receipts, self.retention);
                Ok(())
            },
        )?;

        info!(
            tenant_id,
            order_id = %receipt.order_id,
            transaction_id = %receipt.transaction_id,
            amount = receipt.amount,
            currency = %receipt.currency,
            "Payment processed"
        );
        Ok(receipt)
    }

    /// The tenant's receipts, newest first.
    pub fn transactions(
        &self,
        tenant_id: TenantId,
        pagination: Pagination,
    ) -> Result<PaginatedResult<PaymentReceipt>, IntegrationError> {
        let receipts: Vec<PaymentReceipt> =
            store::load(self.store.as_ref(), tenant_id, RECEIPTS_KEY)?;
        let total = receipts.len() as u64;
        let items = receipts
            .into_iter()
            .rev()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .collect();
        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTenantStore;

    fn gateway() -> PaymentGateway {
        PaymentGateway::new(Arc::new(InMemoryTenantStore::new()), PaymentKeys::default())
    }

    fn request(method: &str, amount: f64) -> PaymentRequest {
        PaymentRequest {
            order_id: Uuid::new_v4(),
            amount,
            currency: "twd".into(),
            payment_method: method.into(),
        }
    }

    #[test]
    fn supported_methods_complete() {
        let gw = gateway();
        for method in ["stripe", "newebpay"] {
            let receipt = gw.process(1, request(method, 120.0)).unwrap();
            assert_eq!(receipt.status, PaymentStatus::Completed);
            assert_eq!(receipt.currency, "TWD");
        }
    }

    #[test]
    fn unknown_method_is_unsupported() {
        let err = gateway().process(1, request("paypal", 10.0)).unwrap_err();
        assert!(matches!(err, IntegrationError::UnsupportedPaymentMethod(_)));
        assert_eq!(err.to_string(), "Unsupported payment method");
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let gw = gateway();
        for amount in [0.0, -5.0, f64::NAN] {
            assert!(matches!(
                gw.process(1, request("stripe", amount)),
                Err(IntegrationError::InvalidInput(_))
            ));
        }
        assert_eq!(gw.transactions(1, Pagination::default()).unwrap().total, 0);
    }

    #[test]
    fn transactions_are_newest_first_and_tenant_scoped() {
        let gw = gateway();
        let first = gw.process(1, request("stripe", 1.0)).unwrap();
        let second = gw.process(1, request("newebpay", 2.0)).unwrap();
        gw.process(2, request("stripe", 3.0)).unwrap();

        let page = gw.transactions(1, Pagination::default()).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].transaction_id, second.transaction_id);
        assert_eq!(page.items[1].transaction_id, first.transaction_id);

        let offset = gw
            .transactions(1, Pagination { offset: 1, limit: 10 })
            .unwrap();
        assert_eq!(offset.items.len(), 1);
        assert_eq!(offset.items[0].transaction_id, first.transaction_id);
    }

    #[test]
    fn receipt_history_is_capped_per_tenant() {
        let gw = gateway().with_retention(3);
        let mut ids = Vec::new();
        for i in 1..=5 {
            ids.push(gw.process(1, request("stripe", i as f64)).unwrap().transaction_id);
        }
        gw.process(2, request("stripe", 1.0)).unwrap();

        let page = gw.transactions(1, Pagination::default()).unwrap();
        assert_eq!(page.total, 3);
        let kept: Vec<Uuid> = page.items.iter().map(|r| r.transaction_id).collect();
        assert_eq!(kept, vec![ids[4], ids[3], ids[2]]);
        assert_eq!(gw.transactions(2, Pagination::default()).unwrap().total, 1);
    }

    #[test]
    fn mock_keys_are_simulated() {
        let keys = PaymentKeys {
            stripe_api_key: Some("sk_live_real".into()),
            newebpay_api_key: Some("mock_newebpay".into()),
        };
        assert_eq!(keys.simulated_methods(), vec![PaymentMethod::Newebpay]);
    }
}
