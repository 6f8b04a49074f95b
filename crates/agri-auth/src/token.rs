//! JWT access token issuance and verification.

use agri_core::models::identity::TenantContext;
use agri_core::models::tenant::TenantId;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject: the authenticated username.
    pub sub: String,
    /// Tenant every request made with this token is scoped to.
    pub tenant_id: TenantId,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Claims as read back from an untrusted token. Identity fields are
/// optional here so that their absence maps to a precise error.
#[derive(Debug, Deserialize)]
struct PresentedClaims {
    sub: Option<String>,
    tenant_id: Option<TenantId>,
}

/// Sign an arbitrary claim set with the configured secret and algorithm.
pub fn encode_claims<T: Serialize>(claims: &T, config: &AuthConfig) -> Result<String, AuthError> {
    let header = Header::new(config.algorithm()?);
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&header, claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Issue a signed access token for `subject` within `tenant_id`.
pub fn issue_access_token(
    subject: &str,
    tenant_id: TenantId,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let exp = i64::try_from(config.access_token_lifetime_secs)
        .ok()
        .and_then(|lifetime| now.checked_add(lifetime))
        .ok_or_else(|| AuthError::Config("access token lifetime out of range".into()))?;
    let claims = AccessTokenClaims {
        sub: subject.to_string(),
        tenant_id,
        iat: now,
        exp,
    };
    encode_claims(&claims, config)
}

fn validation(algorithm: Algorithm) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp"]);
    validation
}

/// Verify a bearer token and return the identity it carries.
///
/// Signature and expiry are checked first. An expired token is reported
/// as such even when its signature is valid.
pub fn validate_access_token(token: &str, config: &AuthConfig) -> Result<TenantContext, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let claims = jsonwebtoken::decode::<PresentedClaims>(token, &key, &validation(config.algorithm()?))
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })?;

    let subject = claims
        .sub
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AuthError::TokenInvalid("missing sub claim".into()))?;
    let tenant_id = claims
        .tenant_id
        .ok_or_else(|| AuthError::TokenInvalid("missing tenant_id claim".into()))?;

    Ok(TenantContext::new(subject, tenant_id))
}

/// Extract the token from an `Authorization` header value.
///
/// A missing header, a scheme other than `Bearer`, or an empty token all
/// count as no credentials at all.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingCredentials)?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MissingCredentials)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "unit-test-secret".into(),
            ..Default::default()
        }
    }

    #[test]
    fn jwt_roundtrip() {
        let config = test_config();
        let token = issue_access_token("agribridge_user", 1, &config).unwrap();
        let ctx = validate_access_token(&token, &config).unwrap();

        assert_eq!(ctx.subject(), "agribridge_user");
        assert_eq!(ctx.tenant_id(), 1);
    }

    #[test]
    fn out_of_range_lifetime_does_not_wrap() {
        let config = AuthConfig {
            access_token_lifetime_secs: u64::MAX,
            ..test_config()
        };
        assert!(matches!(
            issue_access_token("u", 1, &config),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn configured_algorithm_is_used() {
        let config = AuthConfig {
            jwt_algorithm: "HS512".into(),
            ..test_config()
        };
        let token = issue_access_token("u", 3, &config).unwrap();
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS512);
        assert_eq!(validate_access_token(&token, &config).unwrap().tenant_id(), 3);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: "u".into(),
            tenant_id: 1,
            iat: now - 120,
            exp: now - 60,
        };
        let token = encode_claims(&claims, &config).unwrap();
        assert!(matches!(
            validate_access_token(&token, &config),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = issue_access_token("u", 1, &test_config()).unwrap();
        let other = AuthConfig {
            jwt_secret: "another-secret".into(),
            ..Default::default()
        };
        assert!(matches!(
            validate_access_token(&token, &other),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn missing_tenant_claim_is_invalid() {
        let config = test_config();
        let claims = serde_json::json!({
            "sub": "u",
            "exp": Utc::now().timestamp() + 600,
        });
        let token = encode_claims(&claims, &config).unwrap();
        let err = validate_access_token(&token, &config).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(ref m) if m.contains("tenant_id")));
    }

    #[test]
    fn missing_exp_is_invalid() {
        let config = test_config();
        let claims = serde_json::json!({ "sub": "u", "tenant_id": 1 });
        let token = encode_claims(&claims, &config).unwrap();
        assert!(matches!(
            validate_access_token(&token, &config),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(bearer_token(Some("bearer abc")).unwrap(), "abc");
        assert!(matches!(
            bearer_token(None),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            bearer_token(Some("Basic dXNlcjpwdw==")),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            bearer_token(Some("Bearer")),
            Err(AuthError::MissingCredentials)
        ));
    }
}
