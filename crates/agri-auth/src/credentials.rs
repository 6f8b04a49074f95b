//! Credential stores: the user-lookup side of login.

use agri_core::models::tenant::TenantId;

use crate::error::AuthError;
use crate::password;

/// An authenticated user and the tenant their token will be scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub tenant_id: TenantId,
}

/// Checks a username/password pair.
///
/// Implementations must return [`AuthError::InvalidCredentials`] for
/// both an unknown user and a wrong password.
pub trait CredentialStore: Send + Sync {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<Principal, AuthError>> + Send;
}

/// Accepts exactly one configured credential pair.
#[derive(Debug, Clone)]
pub struct StaticCredentialStore {
    username: String,
    password_hash: String,
    tenant_id: TenantId,
}

impl StaticCredentialStore {
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        tenant_id: TenantId,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            tenant_id,
        }
    }

    /// Build the store from a plaintext password, hashing it immediately.
    pub fn from_plaintext(
        username: impl Into<String>,
        password: &str,
        tenant_id: TenantId,
    ) -> Result<Self, AuthError> {
        let hash = password::hash_password(password)?;
        Ok(Self::new(username, hash, tenant_id))
    }
}

impl CredentialStore for StaticCredentialStore {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        // Hash check runs on every attempt so both failure paths cost the same.
        let password_ok = password::verify_password(password, &self.password_hash)?;
        let username_ok = username == self.username;

        if username_ok && password_ok {
            Ok(Principal {
                subject: self.username.clone(),
                tenant_id: self.tenant_id,
            })
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}
