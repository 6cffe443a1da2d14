//! Single-value TTL cache for the daily quote

use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

/// A quote with its author, as served to clients
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Quote {
    pub quote: String,
    pub author: String,
}

struct CachedQuote {
    value: Quote,
    fetched_at: Instant,
}

/// Process-wide quote cache with a fixed TTL.
///
/// Lifecycle: populated on a successful fetch, considered expired once the
/// TTL elapses, never cleared on failure (stale-serve-on-error policy).
pub struct QuoteCache {
    inner: RwLock<Option<CachedQuote>>,
    ttl: Duration,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(None),
            ttl,
        }
    }

    /// Get the cached quote if it is still within the TTL
    pub fn get_fresh(&self) -> Option<Quote> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(cached) if cached.fetched_at.elapsed() < self.ttl => {
                debug!("Quote cache hit");
                Some(cached.value.clone())
            }
            _ => {
                debug!("Quote cache miss");
                None
            }
        }
    }

    /// Get the cached quote regardless of age (stale-serve-on-error)
    pub fn get_stale(&self) -> Option<Quote> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|cached| cached.value.clone())
    }

    /// Store a freshly fetched quote
    pub fn set(&self, value: Quote) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(CachedQuote {
            value,
            fetched_at: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(text: &str) -> Quote {
        Quote {
            quote: text.into(),
            author: "Seneca".into(),
        }
    }

    #[test]
    fn test_empty_cache_misses() {
        let cache = QuoteCache::new(Duration::from_secs(60));
        assert_eq!(cache.get_fresh(), None);
        assert_eq!(cache.get_stale(), None);
    }

    #[test]
    fn test_fresh_hit_within_ttl() {
        let cache = QuoteCache::new(Duration::from_secs(60));
        cache.set(quote("Luck is what happens when preparation meets opportunity."));

        assert_eq!(
            cache.get_fresh().map(|q| q.quote),
            Some("Luck is what happens when preparation meets opportunity.".to_string())
        );
    }

    #[test]
    fn test_expired_entry_still_served_stale() {
        // Zero TTL: every entry is expired immediately
        let cache = QuoteCache::new(Duration::from_nanos(1));
        cache.set(quote("We suffer more often in imagination than in reality."));
        std::thread::sleep(Duration::from_millis(2));

        assert_eq!(cache.get_fresh(), None);
        assert!(cache.get_stale().is_some());
    }

    #[test]
    fn test_set_replaces_previous_value() {
        let cache = QuoteCache::new(Duration::from_secs(60));
        cache.set(quote("first"));
        cache.set(quote("second"));

        assert_eq!(cache.get_fresh().map(|q| q.quote), Some("second".to_string()));
    }
}
