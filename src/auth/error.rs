use thiserror::Error;

use crate::config::booking_api::ConfigurationError;

/// Why a bearer token could not be produced.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Required settings are absent. Not retryable without operator action.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The authorization endpoint answered, but not with a usable token.
    #[error("authorization endpoint returned {status}: {detail}")]
    Upstream { status: u16, detail: String },

    /// The exchange never got an answer (DNS, connect, reset, timeout).
    #[error("authorization endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AuthError {
    /// Metric label and log field
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::Configuration(_) => "configuration",
            AuthError::Upstream { .. } => "upstream",
            AuthError::Transport(_) => "transport",
        }
    }
}
