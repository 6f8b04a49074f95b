//! Integration-layer error types and conversions.

use agri_core::error::AgriError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("Unsupported payment method")]
    UnsupportedPaymentMethod(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("No IoT data found for this device or tenant")]
    NoReadings { device_id: String },

    /// The collaborator has no credentials configured.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("state store error: {0}")]
    Store(String),
}

impl From<IntegrationError> for AgriError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::UnsupportedPaymentMethod(_) => {
                AgriError::UnsupportedOperation(err.to_string())
            }
            IntegrationError::InvalidInput(message) => AgriError::Validation { message },
            IntegrationError::NoReadings { .. } => AgriError::NoData(err.to_string()),
            IntegrationError::NotConfigured(_) => AgriError::Unavailable(err.to_string()),
            IntegrationError::InvalidSignature => AgriError::InvalidSignature,
            IntegrationError::Store(msg) => AgriError::Internal(msg),
        }
    }
}
