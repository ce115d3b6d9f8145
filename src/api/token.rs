//! Bearer token caching and expiry tracking.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Assumed token lifetime; the auth endpoint does not report one.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(90 * 60);

/// Safety margin subtracted from the expiry instant.
pub const DEFAULT_EXPIRY_SKEW: Duration = Duration::from_secs(30);

/// Source of fresh bearer tokens.
///
/// Implementations issue exactly one network call per `acquire` and never
/// retry internally.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Obtain a new token value.
    async fn acquire(&self) -> Result<String>;
}

/// A bearer token together with its estimated expiry.
#[derive(Debug, Clone)]
pub struct Token {
    pub value: String,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: Instant,
}

impl Token {
    /// Whether the token can still be used at `now`, keeping `skew` in reserve.
    pub fn is_valid_at(&self, now: Instant, skew: Duration) -> bool {
        now.checked_add(skew)
            .map(|deadline| deadline < self.expires_at)
            .unwrap_or(false)
    }
}

/// Owns the current token and refreshes it through a [`TokenProvider`].
pub struct TokenStore<P> {
    provider: P,
    current: Option<Token>,
    lifetime: Duration,
    skew: Duration,
    refreshes: u64,
}

impl<P: TokenProvider> TokenStore<P> {
    /// Create a store with the default lifetime estimate and skew.
    pub fn new(provider: P) -> Self {
        Self::with_lifetime(provider, DEFAULT_TOKEN_LIFETIME, DEFAULT_EXPIRY_SKEW)
    }

    /// Create a store with an explicit lifetime estimate and skew.
    pub fn with_lifetime(provider: P, lifetime: Duration, skew: Duration) -> Self {
        Self {
            provider,
            current: None,
            lifetime,
            skew,
            refreshes: 0,
        }
    }

    /// Return the cached token if still valid, otherwise acquire a new one.
    ///
    /// On failure the previously cached token (if any) is kept.
    pub async fn get_valid_token(&mut self) -> Result<&Token> {
        if self.has_valid_token() {
            // Checked just above.
            return self
                .current
                .as_ref()
                .ok_or_else(|| Error::AuthUnavailable("token vanished".into()));
        }
        self.refresh().await
    }

    /// Discard the cached token and acquire a new one, bypassing the cache.
    pub async fn force_refresh(&mut self) -> Result<&Token> {
        self.current = None;
        self.refresh().await
    }

    /// Whether a cached token exists and is inside its validity window.
    pub fn has_valid_token(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|t| t.is_valid_at(Instant::now(), self.skew))
    }

    /// The cached token, valid or not.
    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Number of successful acquisitions so far.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    async fn refresh(&mut self) -> Result<&Token> {
        let value = match self.provider.acquire().await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to obtain token: {}", e);
                return Err(Error::AuthUnavailable(e.to_string()));
            }
        };

        let now = Instant::now();
        // An unrepresentable expiry counts as already expired.
        let token = Token {
            value,
            acquired_at: Utc::now(),
            expires_at: now.checked_add(self.lifetime).unwrap_or(now),
        };

        self.refreshes += 1;
        tracing::debug!(
            "Acquired token #{} at {} (assumed valid for {} minutes)",
            self.refreshes,
            token.acquired_at.format("%H:%M:%S"),
            self.lifetime.as_secs() / 60
        );

        Ok(&*self.current.insert(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Hands out scripted results and counts calls.
    struct ScriptedProvider {
        results: Mutex<VecDeque<Result<String>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProvider {
        fn new(results: Vec<Result<String>>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    results: Mutex::new(results.into()),
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl TokenProvider for ScriptedProvider {
        async fn acquire(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Config("script exhausted".into())))
        }
    }

    fn auth_failure() -> Error {
        Error::AuthRequestFailed {
            status: Some(500),
            message: "boom".into(),
        }
    }

    #[tokio::test]
    async fn test_cache_hit_does_not_call_provider() {
        let (provider, calls) = ScriptedProvider::new(vec![Ok("t1".into())]);
        let mut store = TokenStore::new(provider);

        assert_eq!(store.get_valid_token().await.unwrap().value, "t1");
        assert_eq!(store.get_valid_token().await.unwrap().value, "t1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_token_inside_skew_is_refreshed() {
        // Lifetime shorter than the skew: every token is already stale.
        let (provider, calls) = ScriptedProvider::new(vec![Ok("t1".into()), Ok("t2".into())]);
        let mut store =
            TokenStore::with_lifetime(provider, Duration::from_secs(10), Duration::from_secs(30));

        assert_eq!(store.get_valid_token().await.unwrap().value, "t1");
        assert_eq!(store.get_valid_token().await.unwrap().value, "t2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_token() {
        let (provider, _) = ScriptedProvider::new(vec![Ok("t1".into()), Err(auth_failure())]);
        let mut store =
            TokenStore::with_lifetime(provider, Duration::from_secs(10), Duration::from_secs(30));

        store.get_valid_token().await.unwrap();
        let err = store.get_valid_token().await.unwrap_err();
        assert!(matches!(err, Error::AuthUnavailable(_)));
        assert_eq!(store.current().unwrap().value, "t1");
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let (provider, calls) = ScriptedProvider::new(vec![Ok("t1".into()), Ok("t2".into())]);
        let mut store = TokenStore::new(provider);

        store.get_valid_token().await.unwrap();
        assert_eq!(store.force_refresh().await.unwrap().value, "t2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.refresh_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_force_refresh_discards_token() {
        let (provider, _) = ScriptedProvider::new(vec![Ok("t1".into()), Err(auth_failure())]);
        let mut store = TokenStore::new(provider);

        store.get_valid_token().await.unwrap();
        assert!(store.force_refresh().await.is_err());
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_unrepresentable_lifetime_expires_immediately() {
        let (provider, calls) = ScriptedProvider::new(vec![Ok("t1".into()), Ok("t2".into())]);
        let mut store = TokenStore::with_lifetime(provider, Duration::MAX, DEFAULT_EXPIRY_SKEW);

        assert_eq!(store.get_valid_token().await.unwrap().value, "t1");
        assert!(!store.has_valid_token());
        assert_eq!(store.get_valid_token().await.unwrap().value, "t2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_token_validity_window() {
        let now = Instant::now();
        let token = Token {
            value: "t".into(),
            acquired_at: Utc::now(),
            expires_at: now + Duration::from_secs(60),
        };
        assert!(token.is_valid_at(now, Duration::from_secs(30)));
        assert!(!token.is_valid_at(now + Duration::from_secs(30), Duration::from_secs(30)));
        assert!(!token.is_valid_at(now + Duration::from_secs(45), Duration::from_secs(30)));
    }
}
