use serde::Deserialize;
use std::time::Duration;

use crate::config::booking_api::BookingApiConfig;
use crate::config::settings::SettingsConfig;
use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_REFRESH_BUFFER_SECS};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    #[serde(default)]
    pub booking_api: BookingApiConfig,
}

impl ServiceConfig {
    pub fn refresh_buffer(&self) -> Duration {
        Duration::from_secs(
            self.settings
                .refresh_buffer_seconds
                .unwrap_or(DEFAULT_REFRESH_BUFFER_SECS),
        )
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.http_timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS))
    }
}
