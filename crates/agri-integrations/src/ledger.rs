//! Simulated blockchain ledger.
//!
//! Each tenant has its own append-only chain. An entry's hash is the
//! SHA-256 of the previous entry's hash followed by the entry's own
//! fields, so any edit to an earlier entry breaks every later link.

use std::sync::Arc;

use agri_core::models::tenant::TenantId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::IntegrationError;
use crate::store::{self, TenantStore};

const CHAIN_KEY: &str = "ledger:chain";

/// Previous-hash value of the first entry in every chain.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Number of entries returned by [`BlockchainLedger::recent`] when the
/// caller does not say.
pub const DEFAULT_RECENT: usize = 5;

/// Entries kept per tenant. Older entries are pruned from the front; block
/// ids keep counting from the newest entry.
pub const MAX_ENTRIES_PER_TENANT: usize = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct NewLedgerEntry {
    pub sender: String,
    pub receiver: String,
    pub amount: f64,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    /// 1-based height in the tenant's chain. Survives pruning.
    pub block_id: u64,
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    pub receiver: String,
    pub amount: f64,
    pub data: Option<String>,
    pub previous_hash: String,
    pub hash: String,
}

fn entry_hash(
    previous_hash: &str,
    block_id: u64,
    timestamp: &DateTime<Utc>,
    sender: &str,
    receiver: &str,
    amount: f64,
    data: Option<&str>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous_hash.as_bytes());
    hasher.update(block_id.to_be_bytes());
    hasher.update(
        timestamp
            .to_rfc3339_opts(SecondsFormat::Nanos, true)
            .as_bytes(),
    );
    // Length prefixes keep ("ab", "c") and ("a", "bc") apart.
    for field in [sender, receiver] {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field.as_bytes());
    }
    // Fixed precision so the value survives a trip through the store.
    hasher.update(format!("{amount:.6}").as_bytes());
    match data {
        Some(d) => {
            hasher.update([1u8]);
            hasher.update(d.as_bytes());
        }
        None => hasher.update([0u8]),
    }
    hex::encode(hasher.finalize())
}

impl LedgerEntry {
    fn computed_hash(&self) -> String {
        entry_hash(
            &self.previous_hash,
            self.block_id,
            &self.timestamp,
            &self.sender,
            &self.receiver,
            self.amount,
            self.data.as_deref(),
        )
    }
}

/// Outcome of [`BlockchainLedger::verify_chain`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChainVerification {
    pub valid: bool,
    pub retained_entries: usize,
    /// Height of the newest entry, `None` for an empty chain.
    pub latest_block_id: Option<u64>,
    /// First entry whose link or hash does not check out.
    pub broken_at: Option<u64>,
}

pub struct BlockchainLedger {
    store: Arc<dyn TenantStore>,
    retention: usize,
}

impl BlockchainLedger {
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self {
            store,
            retention: MAX_ENTRIES_PER_TENANT,
        }
    }

    /// Keep at most `retention` entries per tenant.
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention.max(1);
        self
    }

    /// Append an entry to the tenant's chain.
    pub fn record(
        &self,
        tenant_id: TenantId,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, IntegrationError> {
        if entry.sender.trim().is_empty() || entry.receiver.trim().is_empty() {
            return Err(IntegrationError::InvalidInput(
                "sender and receiver must not be empty".into(),
            ));
        }
        if !entry.amount.is_finite() {
            return Err(IntegrationError::InvalidInput(
                "amount must be a finite number".into(),
            ));
        }

        let recorded = store::modify(
            self.store.as_ref(),
            tenant_id,
            CHAIN_KEY,
            |chain: &mut Vec<LedgerEntry>| {
                let previous_hash = chain
                    .last()
                    .map(|e| e.hash.clone())
                    .unwrap_or_else(|| GENESIS_HASH.to_string());
                let block_id = chain.last().map_or(1, |e| e.block_id + 1);
                let timestamp = Utc::now();
                let hash = entry_hash(
                    &previous_hash,
                    block_id,
                    &timestamp,
                    &entry.sender,
                    &entry.receiver,
                    entry.amount,
                    entry.data.as_deref(),
                );
                let recorded = LedgerEntry {
                    block_id,
                    timestamp,
                    sender: entry.sender,
                    receiver: entry.receiver,
                    amount: entry.amount,
                    data: entry.data,
                    previous_hash,
                    hash,
                };
                chain.push(recorded.clone());
                store::retain_latest(chain, self.retention);
                Ok(recorded)
            },
        )?;

        info!(
            tenant_id,
            block_id = recorded.block_id,
            hash = %recorded.hash,
            "Ledger entry recorded"
        );
        Ok(recorded)
    }

    /// The last `limit` entries, newest first.
    pub fn recent(
        &self,
        tenant_id: TenantId,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, IntegrationError> {
        let chain: Vec<LedgerEntry> = store::load(self.store.as_ref(), tenant_id, CHAIN_KEY)?;
        Ok(chain.into_iter().rev().take(limit).collect())
    }

    /// Recompute every link of the tenant's retained chain.
    ///
    /// A pruned chain is anchored on its oldest retained entry; an
    /// unpruned one must start at block 1 on the genesis hash.
    pub fn verify_chain(&self, tenant_id: TenantId) -> Result<ChainVerification, IntegrationError> {
        let chain: Vec<LedgerEntry> = store::load(self.store.as_ref(), tenant_id, CHAIN_KEY)?;
        let broken_at = first_broken_link(&chain);
        if let Some(block_id) = broken_at {
            warn!(tenant_id, block_id, "Ledger chain broken");
        }
        Ok(ChainVerification {
            valid: broken_at.is_none(),
            retained_entries: chain.len(),
            latest_block_id: chain.last().map(|e| e.block_id),
            broken_at,
        })
    }
}

fn first_broken_link(chain: &[LedgerEntry]) -> Option<u64> {
    let first = chain.first()?;
    let (mut expected_id, mut expected_previous) = if first.block_id > 1 {
        (first.block_id, first.previous_hash.as_str())
    } else {
        (1, GENESIS_HASH)
    };
    for entry in chain {
        if entry.block_id != expected_id
            || entry.previous_hash != expected_previous
            || entry.hash != entry.computed_hash()
        {
            return Some(entry.block_id);
        }
        expected_id += 1;
        expected_previous = entry.hash.as_str();
    }
    None
}
