use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use crate::auth::error::AuthError;
use crate::booking::client::BookingResponse;
use crate::booking::error::BookingError;
use crate::config::booking_api::ConfigurationError;

/// Failure of a gateway route, rendered as `{ "error": ... }` JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("failed to obtain authentication token: {0}")]
    Unauthenticated(AuthError),

    #[error("failed to refresh token: {0}")]
    TokenRefresh(AuthError),

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{error} ({status})")]
    Upstream {
        status: StatusCode,
        error: String,
        message: String,
        details: Value,
    },

    /// The booking API answered with something the route cannot interpret.
    #[error("{error}")]
    InvalidResponse {
        error: String,
        details: Option<String>,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Non-2xx booking API answer, passed through with its status.
    pub fn upstream(response: &BookingResponse, error: impl Into<String>) -> Self {
        Self::upstream_with_details(response, error, Value::String(response.body.clone()))
    }

    pub fn upstream_with_details(response: &BookingResponse, error: impl Into<String>, details: Value) -> Self {
        ApiError::Upstream {
            status: response.status,
            error: error.into(),
            message: response.reason().to_owned(),
            details,
        }
    }

    /// Token route errors keep the upstream status instead of collapsing to 401.
    pub fn from_token_refresh(e: AuthError) -> Self {
        match e {
            AuthError::Configuration(missing) => ApiError::Configuration(missing),
            other => ApiError::TokenRefresh(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Internal(rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Configuration(missing) => ApiError::Configuration(missing),
            other => ApiError::Unauthenticated(other),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::Configuration(missing) => ApiError::Configuration(missing),
            BookingError::Auth(auth) => ApiError::from(auth),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("{}", self);
        let (status, body) = match self {
            ApiError::Configuration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Server configuration error" }),
            ),
            ApiError::Unauthenticated(_) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Failed to obtain authentication token" }),
            ),
            ApiError::TokenRefresh(AuthError::Upstream { status, .. }) => (
                StatusCode::from_u16(status)
                    .ok()
                    .filter(|status| status.is_client_error() || status.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                json!({ "error": "Failed to refresh token" }),
            ),
            ApiError::TokenRefresh(other) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal Server Error", "details": other.to_string() }),
            ),
            ApiError::MissingFields(missing) => {
                let details = format!("The following fields are required: {}", missing.join(", "));
                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "Missing required fields",
                        "missingFields": missing,
                        "details": details,
                    }),
                )
            }
            ApiError::Upstream { status, error, message, details } => (
                status,
                json!({ "error": error, "message": message, "details": details }),
            ),
            ApiError::InvalidResponse { error, details } => {
                let mut body = json!({ "error": error });
                if let Some(details) = details {
                    body["details"] = Value::String(details);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            ApiError::Internal(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal Server Error", "details": details }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
