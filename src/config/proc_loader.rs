use std::{fs, path::Path};
use crate::config::settings::{LogFormat, LoggingConfig};
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_LOG_LEVEL, DEFAULT_REFRESH_BUFFER_SECS};
use anyhow::{bail, Result};
use regex::Regex;
use tracing::{debug, error};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)?;

    let expanded = expand_env_vars(&content);
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_validation_errors.inc();
        })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::new(
            DEFAULT_LOG_LEVEL.to_owned(),
            LogFormat::Compact,
        ));
    }
    if service_config.settings.refresh_buffer_seconds.is_none() {
        service_config.settings.refresh_buffer_seconds = Some(DEFAULT_REFRESH_BUFFER_SECS);
    }
    if service_config.settings.http_timeout_ms.is_none() {
        service_config.settings.http_timeout_ms = Some(DEFAULT_HTTP_TIMEOUT_MS);
    }
    service_config.booking_api = service_config.booking_api.normalized();

    debug!("validation config ...");
    validate_service_config(&service_config).inspect_err(|e| {
        error!("config is not valid: {}", e);
        metrics.config_validation_errors.inc();
    })?;

    Ok(service_config)
}

/// Structural checks only; booking API credentials are checked per call.
pub fn validate_service_config(service_config: &ServiceConfig) -> Result<()> {
    let settings = &service_config.settings;
    if settings.http_timeout_ms == Some(0) {
        bail!("settings.http_timeout_ms must be greater than zero");
    }
    if settings.server.port.trim().parse::<u16>().is_err() {
        bail!("settings.server.port '{}' is not a valid port", settings.server.port);
    }
    if settings.server.host.trim().is_empty() {
        bail!("settings.server.host must not be empty");
    }
    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        bail!("settings.metrics.path '{}' must start with '/'", settings.metrics.path);
    }
    Ok(())
}

/// Replaces `${VAR}` and `${VAR:default}` with environment values.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}").expect("env placeholder regex is valid");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
