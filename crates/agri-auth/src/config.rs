//! Authentication configuration.

use jsonwebtoken::Algorithm;
use serde::Deserialize;

use crate::error::AuthError;

/// Secret used when none is configured. Startup logs a warning when it
/// is still in effect.
pub const DEFAULT_JWT_SECRET: &str = "change-me-agribridge-development-secret";

/// Longest accepted access token lifetime: 30 days.
pub const MAX_ACCESS_TOKEN_LIFETIME_SECS: u64 = 30 * 24 * 60 * 60;

/// Configuration for the authentication service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Symmetric signing secret shared by issuance and validation.
    pub jwt_secret: String,
    /// JWS algorithm name: `HS256`, `HS384` or `HS512`.
    pub jwt_algorithm: String,
    /// Access token lifetime in seconds (default: 1800 = 30 minutes).
    pub access_token_lifetime_secs: u64,
    /// Username accepted by the static credential store.
    pub login_username: String,
    /// Plaintext password for the static credential store. Hashed with
    /// Argon2id at startup and never kept in clear afterwards.
    pub login_password: String,
    /// Tenant the static credential maps to.
    pub login_tenant_id: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.into(),
            jwt_algorithm: "HS256".into(),
            access_token_lifetime_secs: 1800,
            login_username: "agribridge_user".into(),
            login_password: "password".into(),
            login_tenant_id: 1,
        }
    }
}

impl AuthConfig {
    /// Resolve the configured algorithm name. Only the HMAC family is
    /// accepted since the key is a shared secret.
    pub fn algorithm(&self) -> Result<Algorithm, AuthError> {
        match self.jwt_algorithm.as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            other => Err(AuthError::Config(format!(
                "unsupported JWT algorithm: {other}"
            ))),
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    /// Check the settings that cannot be fixed at request time.
    pub fn validate(&self) -> Result<(), AuthError> {
        self.algorithm()?;
        if self.jwt_secret.is_empty() {
            return Err(AuthError::Config("JWT secret must not be empty".into()));
        }
        if self.access_token_lifetime_secs == 0 {
            return Err(AuthError::Config(
                "access token lifetime must be positive".into(),
            ));
        }
        if self.access_token_lifetime_secs > MAX_ACCESS_TOKEN_LIFETIME_SECS {
            return Err(AuthError::Config(format!(
                "access token lifetime must not exceed {MAX_ACCESS_TOKEN_LIFETIME_SECS} seconds"
            )));
        }
        Ok(())
    }
}
