use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::auth::error::AuthError;
use crate::auth::exchange::CredentialExchange;
use crate::cache::token::CachedToken;
use crate::cache::token_cache::TokenSlot;
use crate::helpers::preview::token_preview;
use crate::helpers::time::{get_instant, Clock};
use crate::observability::metrics::get_metrics;

/// Anything that can hand out a currently valid bearer token.
pub trait TokenProvider: Send + Sync {
    fn get_token(&self) -> impl std::future::Future<Output = Result<String, AuthError>> + Send;
}

/// Lazily refreshed single-slot token cache.
///
/// A cached token is returned while `now + refresh_buffer < expires_at`.
/// Otherwise exactly one credential exchange is attempted; success
/// overwrites the slot, failure leaves it untouched and is returned to the
/// caller. There is no internal retry and no refresh deduplication.
pub struct TokenManager<E> {
    exchange: E,
    slot: TokenSlot,
    clock: Arc<dyn Clock>,
    refresh_buffer_ms: i64,
}

impl<E: CredentialExchange> TokenManager<E> {
    pub fn new(exchange: E, clock: Arc<dyn Clock>, refresh_buffer: Duration) -> Self {
        Self {
            exchange,
            slot: TokenSlot::new(),
            clock,
            refresh_buffer_ms: i64::try_from(refresh_buffer.as_millis()).unwrap_or(i64::MAX),
        }
    }

    pub fn slot(&self) -> &TokenSlot {
        &self.slot
    }

    pub fn refresh_buffer_ms(&self) -> i64 {
        self.refresh_buffer_ms
    }

    async fn refresh(&self, now_ms: i64) -> Result<CachedToken, AuthError> {
        let issued = self.exchange.exchange().await?;
        let token = CachedToken::new(issued.access_token, now_ms.saturating_add(issued.expires_in_ms));

        // a lifetime shorter than the buffer would hand out an already stale token
        if !token.is_usable_at(now_ms, self.refresh_buffer_ms) {
            return Err(AuthError::Upstream {
                status: 200,
                detail: format!(
                    "token lifetime {}ms does not exceed the refresh buffer {}ms",
                    issued.expires_in_ms, self.refresh_buffer_ms
                ),
            });
        }

        self.slot.set(token.clone()).await;
        info!(
            "token refreshed, expires in {} seconds, preview {}",
            issued.expires_in_ms / 1000,
            token_preview(&token.access_token)
        );
        Ok(token)
    }
}

impl<E: CredentialExchange> TokenProvider for TokenManager<E> {
    async fn get_token(&self) -> Result<String, AuthError> {
        let metrics = get_metrics().await;
        let now_ms = self.clock.now_ms();

        if let Some(cached) = self.slot.get_usable(now_ms, self.refresh_buffer_ms).await {
            metrics.token_cache_hits.inc();
            debug!("using cached token {}", token_preview(&cached.access_token));
            return Ok(cached.access_token);
        }

        info!("refreshing token ...");
        metrics.token_fetch_requests.inc();
        let start = get_instant();
        let result = self.refresh(now_ms).await;
        metrics.token_fetch_duration.observe(start.elapsed().as_secs_f64());

        match result {
            Ok(token) => {
                metrics.token_expiry_unix.set(token.expires_at_ms / 1000);
                Ok(token.access_token)
            }
            Err(e) => {
                metrics.token_fetch_failures.with_label_values(&[e.reason()]).inc();
                error!(reason = e.reason(), "token refresh failed: {}", e);
                Err(e)
            }
        }
    }
}
