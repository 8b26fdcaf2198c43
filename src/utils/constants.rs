//! Shared constants and invariants

pub const DEFAULT_REFRESH_BUFFER_SECS: u64 = 5 * 60;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const SUBSCRIPTION_KEY_HEADER: &str = "x-subscription-key";
pub const TOKEN_PATH: &str = "token";
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

// Booking platform defaults for owners submitted without them
pub const DEFAULT_OWNER_COUNTRY_ID: i64 = 136; // Netherlands
pub const DEFAULT_OWNER_LANGUAGE_ID: i64 = 1; // Dutch
pub const DEFAULT_FEATURE_VALUE: &str = "1";
