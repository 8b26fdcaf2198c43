use serde::Deserialize;
use thiserror::Error;

/// Connection settings for the booking platform.
///
/// Every field is optional at load time. Absent or blank values surface as
/// a [`ConfigurationError`] on the call that needs them.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BookingApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub subscription_key: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing booking API configuration: {}", .missing.join(", "))]
pub struct ConfigurationError {
    pub missing: Vec<&'static str>,
}

/// Everything the client-credentials exchange needs
#[derive(Debug, Clone, Copy)]
pub struct ClientCredentials<'a> {
    pub base_url: &'a str,
    pub subscription_key: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Everything a downstream booking call needs besides the token
#[derive(Debug, Clone, Copy)]
pub struct BookingEndpoint<'a> {
    pub base_url: &'a str,
    pub database: &'a str,
    pub subscription_key: &'a str,
}

impl BookingApiConfig {
    /// Blank values become `None`, trailing slashes are dropped from the base url.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        }
        Self {
            base_url: clean(self.base_url).map(|url| url.trim_end_matches('/').to_owned()),
            database: clean(self.database),
            subscription_key: clean(self.subscription_key),
            client_id: clean(self.client_id),
            client_secret: clean(self.client_secret),
        }
    }

    pub fn client_credentials(&self) -> Result<ClientCredentials<'_>, ConfigurationError> {
        let mut missing = Vec::new();
        let base_url = require(&self.base_url, "base_url", &mut missing);
        let subscription_key = require(&self.subscription_key, "subscription_key", &mut missing);
        let client_id = require(&self.client_id, "client_id", &mut missing);
        let client_secret = require(&self.client_secret, "client_secret", &mut missing);

        match (base_url, subscription_key, client_id, client_secret) {
            (Some(base_url), Some(subscription_key), Some(client_id), Some(client_secret)) => {
                Ok(ClientCredentials {
                    base_url: base_url.trim_end_matches('/'),
                    subscription_key,
                    client_id,
                    client_secret,
                })
            }
            _ => Err(ConfigurationError { missing }),
        }
    }

    pub fn booking_endpoint(&self) -> Result<BookingEndpoint<'_>, ConfigurationError> {
        let mut missing = Vec::new();
        let base_url = require(&self.base_url, "base_url", &mut missing);
        let database = require(&self.database, "database", &mut missing);
        let subscription_key = require(&self.subscription_key, "subscription_key", &mut missing);

        match (base_url, database, subscription_key) {
            (Some(base_url), Some(database), Some(subscription_key)) => Ok(BookingEndpoint {
                base_url: base_url.trim_end_matches('/'),
                database,
                subscription_key,
            }),
            _ => Err(ConfigurationError { missing }),
        }
    }
}

fn require<'a>(
    value: &'a Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<&'a str> {
    let present = value.as_deref().map(str::trim).filter(|v| !v.is_empty());
    if present.is_none() {
        missing.push(name);
    }
    present
}
