use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Lifetime assumed when the exchange response carries no `expires_in`.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(55 * 60);

/// A token is retired this long before its nominal expiry.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(30);

pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    /// Lifetimes above [`MAX_TOKEN_TTL`] are capped.
    pub fn new(value: impl Into<String>, ttl: Duration) -> Self {
        let now = Instant::now();
        let ttl = ttl.min(MAX_TOKEN_TTL);
        Self {
            value: value.into(),
            expires_at: now.checked_add(ttl).unwrap_or(now),
        }
    }

    pub fn from_expires_in(value: impl Into<String>, expires_in: Option<u64>) -> Self {
        let ttl = expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        Self::new(value, ttl)
    }

    pub fn is_usable(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Held across the refresh, so concurrent callers share one `fetch`.
    /// On failure the slot is left empty. A fresh token inside the refresh
    /// margin is returned once but not reused.
    pub async fn get_or_refresh<F, Fut, E>(&self, fetch: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(token) = slot.as_ref().filter(|t| t.is_usable()) {
            return Ok(token.value.clone());
        }

        *slot = None;
        let token = fetch().await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }

    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }

    /// Drops the cached token only if it is still `value`.
    pub async fn invalidate_if_current(&self, value: &str) {
        let mut slot = self.slot.lock().await;
        if slot.as_ref().is_some_and(|t| t.value == value) {
            *slot = None;
        }
    }

    pub async fn has_usable_token(&self) -> bool {
        self.slot
            .lock()
            .await
            .as_ref()
            .map(AccessToken::is_usable)
            .unwrap_or(false)
    }

    #[cfg(test)]
    async fn is_empty(&self) -> bool {
        self.slot.lock().await.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_reuses_token_within_lifetime() {
        let cache = TokenCache::new();
        let counter = AtomicUsize::new(0);
        let fetches = &counter;

        for _ in 0..3 {
            let value = cache
                .get_or_refresh(move || async move {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(AccessToken::from_expires_in("tok", Some(3600)))
                })
                .await
                .unwrap();
            assert_eq!(value, "tok");
            tokio::time::advance(Duration::from_secs(60)).await;
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_after_expiry() {
        let cache = TokenCache::new();
        let counter = AtomicUsize::new(0);
        let fetches = &counter;
        let fetch = move || async move {
            let n = fetches.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(AccessToken::from_expires_in(format!("tok-{n}"), Some(120)))
        };

        assert_eq!(cache.get_or_refresh(fetch).await.unwrap(), "tok-0");
        tokio::time::advance(Duration::from_secs(121)).await;
        assert_eq!(cache.get_or_refresh(fetch).await.unwrap(), "tok-1");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_margin_retires_token_early() {
        let token = AccessToken::from_expires_in("tok", Some(100));
        assert!(token.is_usable());
        tokio::time::advance(Duration::from_secs(75)).await;
        assert!(!token.is_usable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_expires_in_uses_default_ttl() {
        let token = AccessToken::from_expires_in("tok", None);
        tokio::time::advance(DEFAULT_TOKEN_TTL - REFRESH_MARGIN - Duration::from_secs(1)).await;
        assert!(token.is_usable());
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!token.is_usable());
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_cache_empty() {
        let cache = TokenCache::new();
        let result = cache
            .get_or_refresh(|| async { Err::<AccessToken, _>("denied") })
            .await;
        assert_eq!(result, Err("denied"));
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_drops_expired_token() {
        let cache = TokenCache::new();
        cache
            .get_or_refresh(|| async { Ok::<_, &str>(AccessToken::from_expires_in("old", Some(60))) })
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;

        let result = cache
            .get_or_refresh(|| async { Err::<AccessToken, _>("denied") })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_short_lived_token_is_used_once() {
        let cache = TokenCache::new();
        let value = cache
            .get_or_refresh(|| async { Ok::<_, ()>(AccessToken::from_expires_in("brief", Some(5))) })
            .await
            .unwrap();
        assert_eq!(value, "brief");
        assert!(!cache.has_usable_token().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_expires_in_is_capped() {
        let token = AccessToken::from_expires_in("tok", Some(u64::MAX));
        assert!(token.is_usable());
        tokio::time::advance(MAX_TOKEN_TTL).await;
        assert!(!token.is_usable());
    }

    #[tokio::test]
    async fn test_invalidate_if_current_keeps_newer_token() {
        let cache = TokenCache::new();
        cache
            .get_or_refresh(|| async { Ok::<_, ()>(AccessToken::from_expires_in("newer", Some(3600))) })
            .await
            .unwrap();

        cache.invalidate_if_current("older").await;
        assert!(cache.has_usable_token().await);

        cache.invalidate_if_current("newer").await;
        assert!(cache.is_empty().await);
    }

    #[test]
    fn test_debug_redacts_value() {
        let token = AccessToken::new("secret-token", Duration::from_secs(10));
        assert!(!format!("{token:?}").contains("secret-token"));
    }
}
