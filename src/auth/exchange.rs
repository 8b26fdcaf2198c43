use std::sync::Arc;

use http::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::error::AuthError;
use crate::config::booking_api::BookingApiConfig;
use crate::utils::constants::{GRANT_TYPE_CLIENT_CREDENTIALS, SUBSCRIPTION_KEY_HEADER, TOKEN_PATH};

/// A token as issued by the authorization endpoint, before caching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in_ms: i64,
}

/// One round trip to the authorization endpoint. Implementations must not retry.
pub trait CredentialExchange: Send + Sync {
    fn exchange(&self) -> impl std::future::Future<Output = Result<IssuedToken, AuthError>> + Send;
}

/// OAuth2 client-credentials grant against `{base_url}/token`.
#[derive(Debug, Clone)]
pub struct ClientCredentialsExchange {
    client: Client,
    api: Arc<BookingApiConfig>,
}

impl ClientCredentialsExchange {
    pub fn new(client: Client, api: Arc<BookingApiConfig>) -> Self {
        Self { client, api }
    }
}

impl CredentialExchange for ClientCredentialsExchange {
    async fn exchange(&self) -> Result<IssuedToken, AuthError> {
        // fail before any network traffic when settings are absent
        let credentials = self.api.client_credentials()?;
        let url = format!("{}/{}", credentials.base_url, TOKEN_PATH);
        let form = [
            ("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS),
            ("client_id", credentials.client_id),
            ("client_secret", credentials.client_secret),
        ];

        debug!("requesting token from {}", url);
        let response = self
            .client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, credentials.subscription_key)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("token request failed: {} {}", status, body);
            return Err(AuthError::Upstream {
                status: status.as_u16(),
                detail: if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("no response body").to_owned()
                } else {
                    body
                },
            });
        }

        parse_token_response(status.as_u16(), &body)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<f64>,
}

/// Validates a 2xx token body. A missing token or a non-positive lifetime is
/// reported as an upstream error instead of being guessed.
pub fn parse_token_response(status: u16, body: &str) -> Result<IssuedToken, AuthError> {
    let upstream = |detail: String| AuthError::Upstream { status, detail };

    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| upstream(format!("malformed token response: {e}")))?;

    let access_token = parsed
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| upstream("token response has no access_token".to_owned()))?;

    let expires_in = parsed
        .expires_in
        .ok_or_else(|| upstream("token response has no expires_in".to_owned()))?;
    if !expires_in.is_finite() || expires_in <= 0.0 {
        return Err(upstream(format!("token response has invalid expires_in {expires_in}")));
    }

    Ok(IssuedToken {
        access_token,
        expires_in_ms: (expires_in * 1000.0).round() as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_response() {
        let issued = parse_token_response(200, r#"{"access_token":"tok1","expires_in":3600,"token_type":"Bearer"}"#).unwrap();
        assert_eq!(issued, IssuedToken { access_token: "tok1".into(), expires_in_ms: 3_600_000 });
    }

    #[test]
    fn fractional_lifetime_is_kept_in_milliseconds() {
        let issued = parse_token_response(200, r#"{"access_token":"tok1","expires_in":1.5}"#).unwrap();
        assert_eq!(issued.expires_in_ms, 1_500);
    }

    #[test]
    fn missing_or_non_positive_expires_in_is_rejected() {
        for body in [
            r#"{"access_token":"tok1"}"#,
            r#"{"access_token":"tok1","expires_in":0}"#,
            r#"{"access_token":"tok1","expires_in":-30}"#,
            r#"{"access_token":"tok1","expires_in":null}"#,
        ] {
            let err = parse_token_response(200, body).unwrap_err();
            assert!(matches!(err, AuthError::Upstream { status: 200, .. }), "{body}: {err}");
        }
    }

    #[test]
    fn non_numeric_expires_in_is_malformed() {
        let err = parse_token_response(200, r#"{"access_token":"tok1","expires_in":"3600"}"#).unwrap_err();
        assert!(err.to_string().contains("malformed token response"));
    }

    #[test]
    fn missing_token_is_rejected() {
        let err = parse_token_response(200, r#"{"expires_in":3600}"#).unwrap_err();
        assert_eq!(err.reason(), "upstream");

        let err = parse_token_response(200, r#"{"access_token":"","expires_in":3600}"#).unwrap_err();
        assert_eq!(err.reason(), "upstream");
    }

    #[test]
    fn non_json_body_is_rejected() {
        let err = parse_token_response(200, "<html>ok</html>").unwrap_err();
        assert!(matches!(err, AuthError::Upstream { .. }));
    }
}
