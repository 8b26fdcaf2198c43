use thiserror::Error;

use crate::auth::error::AuthError;
use crate::config::booking_api::ConfigurationError;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("failed to obtain authentication token: {0}")]
    Auth(#[from] AuthError),

    #[error("booking API unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid booking API url: {0}")]
    InvalidUrl(String),

    #[error("booking API returned invalid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),
}
