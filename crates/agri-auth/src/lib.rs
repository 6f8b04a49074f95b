//! AgriBridge Auth: credential checking, JWT issuance and bearer-token
//! validation.

pub mod config;
pub mod credentials;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use credentials::{CredentialStore, Principal, StaticCredentialStore};
pub use error::AuthError;
pub use service::{AuthService, LoginInput, LoginOutput};
pub use token::AccessTokenClaims;
