use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::token::CachedToken;

/// Single-slot token store: a refresh overwrites, nothing is ever appended.
///
/// The lock is held only for the copy in or out of the slot, never across
/// a credential exchange, so concurrent refreshes may race and the last
/// completed write wins.
#[derive(Debug, Clone, Default)]
pub struct TokenSlot {
    inner: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenSlot {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(None)) }
    }

    /// Raw slot content, whether fresh or stale
    pub async fn get(&self) -> Option<CachedToken> {
        self.inner.read().await.clone()
    }

    /// Cached token if it is still outside the refresh buffer at `now_ms`
    pub async fn get_usable(&self, now_ms: i64, refresh_buffer_ms: i64) -> Option<CachedToken> {
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_usable_at(now_ms, refresh_buffer_ms))
            .cloned()
    }

    pub async fn set(&self, token: CachedToken) {
        let mut slot = self.inner.write().await;
        *slot = Some(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_slot_has_nothing_usable() {
        let slot = TokenSlot::new();
        assert!(slot.get().await.is_none());
        assert!(slot.get_usable(0, 300_000).await.is_none());
    }

    #[tokio::test]
    async fn set_overwrites_previous_token() {
        let slot = TokenSlot::new();
        slot.set(CachedToken::new("first".into(), 1_000_000)).await;
        slot.set(CachedToken::new("second".into(), 2_000_000)).await;

        let got = slot.get().await.unwrap();
        assert_eq!(got.access_token, "second");
        assert_eq!(got.expires_at_ms, 2_000_000);
    }

    #[tokio::test]
    async fn stale_token_stays_in_slot_but_is_not_usable() {
        let slot = TokenSlot::new();
        slot.set(CachedToken::new("old".into(), 1_000_000)).await;

        assert!(slot.get_usable(900_000, 300_000).await.is_none());
        assert_eq!(slot.get().await.unwrap().access_token, "old");
    }

    #[tokio::test]
    async fn clones_share_the_same_slot() {
        let slot = TokenSlot::new();
        let other = slot.clone();
        other.set(CachedToken::new("shared".into(), 10_000_000)).await;

        assert_eq!(slot.get_usable(0, 300_000).await.unwrap().access_token, "shared");
    }
}
