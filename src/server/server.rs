use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use reqwest::Client;
use tracing::{error, info};

use crate::auth::exchange::ClientCredentialsExchange;
use crate::auth::provider::TokenManager;
use crate::booking::client::BookingClient;
use crate::config::settings::SettingsConfig;
use crate::config::types::ServiceConfig;
use crate::helpers::time::{Clock, SystemClock};
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::routes::{accommodations, catalog, health, token};

pub type GatewayTokens = TokenManager<ClientCredentialsExchange>;
pub type GatewayClient = BookingClient<GatewayTokens>;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub booking: Arc<GatewayClient>,
}

impl AppState {
    pub fn new(metrics: &Metrics, booking: GatewayClient) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            booking: Arc::new(booking),
        }
    }
}

/// Wires one HTTP client, the token manager and the booking client together.
pub fn build_booking_client(service_config: &ServiceConfig, clock: Arc<dyn Clock>) -> Result<GatewayClient> {
    let client = Client::builder()
        .timeout(service_config.http_timeout())
        .build()?;
    let api = Arc::new(service_config.booking_api.clone());

    let exchange = ClientCredentialsExchange::new(client.clone(), api.clone());
    let tokens = TokenManager::new(exchange, clock, service_config.refresh_buffer());
    Ok(BookingClient::new(client, api, Arc::new(tokens)))
}

/// Every gateway route plus health and (when enabled) metrics.
pub fn router(state: AppState, settings_config: &SettingsConfig) -> Router {
    Router::new()
        .route("/api/token", get(token::get_token))
        .route("/api/owners", get(catalog::list_owners).post(catalog::create_owner))
        .route("/api/countries", get(catalog::list_countries))
        .route("/api/features", get(catalog::list_features))
        .route(
            "/api/accommodations",
            get(accommodations::get_accommodations).post(accommodations::save_accommodation),
        )
        .route(
            "/api/accommodations/{id}/rooms",
            get(accommodations::list_rooms)
                .post(accommodations::create_rooms)
                .put(accommodations::update_rooms),
        )
        .route(
            "/api/accommodations/{id}/features",
            get(accommodations::list_accommodation_features)
                .put(accommodations::update_accommodation_features),
        )
        .route("/health", get(health::health))
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state)
}

/// Start the Axum server and serve until ctrl-c.
pub async fn start(service_config: &ServiceConfig) -> Result<()> {
    let metrics = get_metrics().await;
    let booking = build_booking_client(service_config, Arc::new(SystemClock))?;
    let state = AppState::new(metrics, booking);
    let app = router(state, &service_config.settings);

    let server = &service_config.settings.server;
    let bind_addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("listening on {}", bind_addr);

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    metrics.up.set(0);

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
    }
    info!("🧹 shutting down gracefully");
}
