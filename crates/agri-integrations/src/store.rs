//! Tenant-keyed state store for the in-process collaborators.
//!
//! Every value is addressed by `(tenant_id, key)`, so a collaborator can
//! only ever reach the slice of state that belongs to the tenant it was
//! called for. Values are JSON documents; [`load`] and [`modify`] give
//! typed access on top.

use std::collections::HashMap;

use agri_core::models::tenant::TenantId;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::IntegrationError;

/// Read-modify-write callback handed to [`TenantStore::update`].
pub type UpdateFn<'a> = dyn FnMut(Option<Value>) -> Result<Value, IntegrationError> + 'a;

pub trait TenantStore: Send + Sync {
    fn get(&self, tenant_id: TenantId, key: &str) -> Option<Value>;

    fn put(&self, tenant_id: TenantId, key: &str, value: Value);

    /// Replace the value under `key` with the callback's result, holding
    /// the slot exclusively for the duration of the call. The stored
    /// value is left untouched when the callback fails.
    fn update(
        &self,
        tenant_id: TenantId,
        key: &str,
        f: &mut UpdateFn<'_>,
    ) -> Result<(), IntegrationError>;
}

/// Process-memory store. Created at startup, dropped at shutdown.
#[derive(Default)]
pub struct InMemoryTenantStore {
    slots: RwLock<HashMap<(TenantId, String), Value>>,
}

impl InMemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TenantStore for InMemoryTenantStore {
    fn get(&self, tenant_id: TenantId, key: &str) -> Option<Value> {
        self.slots.read().get(&(tenant_id, key.to_string())).cloned()
    }

    fn put(&self, tenant_id: TenantId, key: &str, value: Value) {
        self.slots.write().insert((tenant_id, key.to_string()), value);
    }

    fn update(
        &self,
        tenant_id: TenantId,
        key: &str,
        f: &mut UpdateFn<'_>,
    ) -> Result<(), IntegrationError> {
        let mut slots = self.slots.write();
        let slot = (tenant_id, key.to_string());
        let next = f(slots.get(&slot).cloned())?;
        slots.insert(slot, next);
        Ok(())
    }
}

fn decode<T: DeserializeOwned + Default>(value: Option<Value>) -> Result<T, IntegrationError> {
    match value {
        Some(v) => serde_json::from_value(v).map_err(|e| IntegrationError::Store(e.to_string())),
        None => Ok(T::default()),
    }
}

/// Drop the oldest items so that at most `max` remain.
pub fn retain_latest<T>(items: &mut Vec<T>, max: usize) {
    if items.len() > max {
        let excess = items.len() - max;
        items.drain(..excess);
    }
}

/// Typed read. A missing key yields `T::default()`.
pub fn load<T: DeserializeOwned + Default>(
    store: &dyn TenantStore,
    tenant_id: TenantId,
    key: &str,
) -> Result<T, IntegrationError> {
    decode(store.get(tenant_id, key))
}

/// Typed atomic read-modify-write. `f` sees the current state (or the
/// default) and its changes are written back only if it succeeds.
pub fn modify<T, R>(
    store: &dyn TenantStore,
    tenant_id: TenantId,
    key: &str,
    f: impl FnOnce(&mut T) -> Result<R, IntegrationError>,
) -> Result<R, IntegrationError>
where
    T: Serialize + DeserializeOwned + Default,
{
    let mut f = Some(f);
    let mut output = None;
    store.update(tenant_id, key, &mut |current| {
        let mut state: T = decode(current)?;
        let f = f
            .take()
            .ok_or_else(|| IntegrationError::Store("update callback re-entered".into()))?;
        output = Some(f(&mut state)?);
        serde_json::to_value(&state).map_err(|e| IntegrationError::Store(e.to_string()))
    })?;
    output.ok_or_else(|| IntegrationError::Store("update callback was not invoked".into()))
}
