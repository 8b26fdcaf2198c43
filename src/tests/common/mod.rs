// tests/common/mod.rs

pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use reqwest::Client;

use crate::auth::exchange::ClientCredentialsExchange;
use crate::auth::provider::TokenManager;
use crate::config::booking_api::BookingApiConfig;
use crate::config::types::ServiceConfig;
use crate::helpers::time::Clock;

pub const SUBSCRIPTION_KEY: &str = "sub-key";
pub const REFRESH_BUFFER: Duration = Duration::from_secs(300);

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Clock that only moves when the test says so.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn at(now_ms: i64) -> Arc<Self> {
        Arc::new(Self { now_ms: AtomicI64::new(now_ms) })
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

pub fn booking_api(base_url: &str) -> BookingApiConfig {
    BookingApiConfig {
        base_url: Some(base_url.to_owned()),
        database: Some("demo".to_owned()),
        subscription_key: Some(SUBSCRIPTION_KEY.to_owned()),
        client_id: Some("client".to_owned()),
        client_secret: Some("secret".to_owned()),
    }
}

pub fn token_manager(api: BookingApiConfig, clock: Arc<ManualClock>) -> TokenManager<ClientCredentialsExchange> {
    let exchange = ClientCredentialsExchange::new(build_reqwest_client(), Arc::new(api));
    TokenManager::new(exchange, clock, REFRESH_BUFFER)
}

/// Authorization endpoint answering with `token` valid for `expires_in` seconds
pub fn mock_token<'a>(server: &'a MockServer, token: &str, expires_in: i64) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(POST)
            .path("/token")
            .header("x-subscription-key", SUBSCRIPTION_KEY);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "access_token": token,
                "expires_in": expires_in,
                "token_type": "Bearer"
            }));
    })
}

/// Gateway config pointing at `base_url`, metrics enabled
pub fn gateway_config(base_url: &str) -> ServiceConfig {
    let yaml = format!(
        r#"
settings:
  server:
    host: 127.0.0.1
    port: "0"
  metrics:
    path: /metrics
    is_enabled: true
booking_api:
  base_url: "{base_url}"
  database: demo
  subscription_key: {SUBSCRIPTION_KEY}
  client_id: client
  client_secret: secret
"#
    );
    serde_yaml::from_str(&yaml).expect("test config")
}

/// Address nobody listens on
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
