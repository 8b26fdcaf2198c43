use std::sync::Arc;

use http::header::ACCEPT;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::auth::provider::TokenProvider;
use crate::booking::error::BookingError;
use crate::config::booking_api::{BookingApiConfig, BookingEndpoint, ConfigurationError};
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::SUBSCRIPTION_KEY_HEADER;

/// Raw answer from the booking API; interpretation is left to the route.
#[derive(Debug, Clone)]
pub struct BookingResponse {
    pub status: StatusCode,
    pub body: String,
}

impl BookingResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// HTTP reason phrase, e.g. `Not Found`
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    pub fn json(&self) -> Result<Value, BookingError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Authenticated client for `{base_url}/{database}/...` endpoints.
pub struct BookingClient<P> {
    http: Client,
    api: Arc<BookingApiConfig>,
    tokens: Arc<P>,
}

impl<P: TokenProvider> BookingClient<P> {
    pub fn new(http: Client, api: Arc<BookingApiConfig>, tokens: Arc<P>) -> Self {
        Self { http, api, tokens }
    }

    pub fn tokens(&self) -> &P {
        &self.tokens
    }

    pub fn endpoint(&self) -> Result<BookingEndpoint<'_>, ConfigurationError> {
        self.api.booking_endpoint()
    }

    /// Sends one request. No token means no request: an auth failure is
    /// returned before anything reaches the booking API.
    pub async fn send(
        &self,
        route: &str,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<BookingResponse, BookingError> {
        let endpoint = self.endpoint()?;
        let token = self.tokens.get_token().await?;
        let url = booking_url(&endpoint, segments)?;

        let metrics = get_metrics().await;
        metrics.booking_requests.with_label_values(&[route, method.as_str()]).inc();
        let start = get_instant();
        debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(&token)
            .header(SUBSCRIPTION_KEY_HEADER, endpoint.subscription_key)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let result = match request.send().await {
            Ok(response) => {
                let status = response.status();
                response.text().await.map(|body| (status, body))
            }
            Err(e) => Err(e),
        };
        metrics.booking_duration.with_label_values(&[route]).observe(start.elapsed().as_secs_f64());

        let (status, body) = result.inspect_err(|e| {
            error!("booking API request for {} failed: {}", route, e);
            metrics.booking_failures.with_label_values(&[route, "transport"]).inc();
        })?;

        if !status.is_success() {
            warn!("booking API error for {}: {} {}", route, status, body);
            metrics.booking_failures.with_label_values(&[route, status.as_str()]).inc();
        }
        Ok(BookingResponse { status, body })
    }
}

/// `{base_url}/{database}/{segments...}` with every segment percent-encoded.
pub fn booking_url(endpoint: &BookingEndpoint<'_>, segments: &[&str]) -> Result<Url, BookingError> {
    let mut url = Url::parse(endpoint.base_url)
        .map_err(|e| BookingError::InvalidUrl(format!("{}: {}", endpoint.base_url, e)))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| BookingError::InvalidUrl(format!("{} cannot be a base", endpoint.base_url)))?;
        path.pop_if_empty().push(endpoint.database).extend(segments);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(base_url: &str) -> BookingEndpoint<'_> {
        BookingEndpoint {
            base_url,
            database: "demo",
            subscription_key: "key",
        }
    }

    #[test]
    fn url_joins_database_and_segments() {
        let url = booking_url(&endpoint("https://api.example.test"), &["accommodations", "42", "rooms"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/demo/accommodations/42/rooms");
    }

    #[test]
    fn url_keeps_base_path() {
        let url = booking_url(&endpoint("https://api.example.test/v2"), &["owners"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/v2/demo/owners");
    }

    #[test]
    fn url_encodes_path_ids() {
        let url = booking_url(&endpoint("https://api.example.test"), &["accommodations", "1/../x"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/demo/accommodations/1%2F..%2Fx");
    }

    struct FixedToken;

    impl TokenProvider for FixedToken {
        async fn get_token(&self) -> Result<String, crate::auth::error::AuthError> {
            Ok("tok".to_owned())
        }
    }

    #[tokio::test]
    async fn transport_failure_still_records_duration() {
        let api = BookingApiConfig {
            base_url: Some(crate::tests::common::closed_port_url().await),
            database: Some("demo".into()),
            subscription_key: Some("key".into()),
            client_id: None,
            client_secret: None,
        };
        let client = BookingClient::new(Client::new(), Arc::new(api), Arc::new(FixedToken));
        let duration = get_metrics()
            .await
            .booking_duration
            .with_label_values(&["closed_port_owners"]);

        let err = client
            .send("closed_port_owners", Method::GET, &["owners"], None)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Transport(_)), "{err}");
        assert_eq!(duration.get_sample_count(), 1);
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let err = booking_url(&endpoint("not a url"), &["owners"]).unwrap_err();
        assert!(matches!(err, BookingError::InvalidUrl(_)));
    }
}
