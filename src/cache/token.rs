/// The single credential the gateway holds for the booking platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at_ms: i64, // UNIX TIMESTAMP, milliseconds
}

impl CachedToken {
    pub fn new(access_token: String, expires_at_ms: i64) -> Self {
        Self { access_token, expires_at_ms }
    }

    /// A token is usable only while `now + refresh_buffer < expires_at`.
    pub fn is_usable_at(&self, now_ms: i64, refresh_buffer_ms: i64) -> bool {
        now_ms.saturating_add(refresh_buffer_ms) < self.expires_at_ms
    }
}
