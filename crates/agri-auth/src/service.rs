//! Authentication service: login and bearer validation orchestration.

use agri_core::error::AgriResult;
use agri_core::models::identity::TenantContext;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::credentials::CredentialStore;
use crate::error::AuthError;
use crate::token;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over the credential store so that user lookup can be swapped
/// without touching token handling. Stateless apart from its
/// configuration, which is read-only after construction.
pub struct AuthService<C: CredentialStore> {
    credentials: C,
    config: AuthConfig,
}

impl<C: CredentialStore> AuthService<C> {
    /// Build the service, rejecting configurations that could never sign
    /// or verify a token.
    pub fn new(credentials: C, config: AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;
        Ok(Self {
            credentials,
            config,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Check a username/password pair and issue an access token.
    pub async fn login(&self, input: LoginInput) -> AgriResult<LoginOutput> {
        let principal = match self
            .credentials
            .authenticate(&input.username, &input.password)
            .await
        {
            Ok(p) => p,
            Err(AuthError::InvalidCredentials) => {
                warn!(username = %input.username, "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e.into()),
        };

        let access_token =
            token::issue_access_token(&principal.subject, principal.tenant_id, &self.config)?;

        info!(
            subject = %principal.subject,
            tenant_id = principal.tenant_id,
            "Access token issued"
        );

        Ok(LoginOutput {
            access_token,
            token_type: "bearer",
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Validate a raw bearer token.
    pub fn validate(&self, token: &str) -> AgriResult<TenantContext> {
        Ok(token::validate_access_token(token, &self.config)?)
    }

    /// Resolve the caller from an `Authorization` header value.
    pub fn authenticate_header(&self, header: Option<&str>) -> AgriResult<TenantContext> {
        let token = token::bearer_token(header)?;
        self.validate(token)
    }
}
