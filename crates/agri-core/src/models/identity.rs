//! Verified caller identity.

use serde::Serialize;

use super::tenant::TenantId;

/// The `{subject, tenant_id}` pair produced by bearer-token validation
/// and consumed by every tenant-scoped operation.
///
/// Both fields are required and the value is immutable once built, so a
/// context without a tenant cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    subject: String,
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(subject: impl Into<String>, tenant_id: TenantId) -> Self {
        Self {
            subject: subject.into(),
            tenant_id,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}
