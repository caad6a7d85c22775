//! In-memory principal cache for expensive credential validation.
//!
//! Caches extraction results keyed by the raw, unparsed credential string
//! (e.g. the full `Authorization` header value), shared by all concurrent
//! requests presenting the same material.
//!
//! # Caching discipline
//!
//! Equal raw material always yields the same principal without
//! re-validation. Callers whose credential semantics are time-limited must
//! either key on a value that already encodes the freshness window (a JWT's
//! raw text embeds its `exp`, so a rotated token is a new key) or bypass
//! the cache for that scheme entirely.
//!
//! # Concurrency
//!
//! No lock is held across the extraction await: concurrent first-time
//! requests for the same key may each perform extraction, and the last
//! equal-key insert overwrites. Duplicate work is tolerated; duplicate
//! stored entries are not. Failed extractions are never stored.

use authgate_model::Principal;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace};

/// Shared cache of extracted principals keyed by raw credential material.
#[derive(Debug, Default)]
pub struct PrincipalCache {
    entries: DashMap<String, Arc<Principal>>,
}

impl PrincipalCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Return the cached principal for `key`, or run `extract` and store
    /// the result on success.
    ///
    /// The extraction future runs outside any map lock; failures are
    /// propagated untouched and never cached.
    pub async fn get_or_extract<F, Fut, E>(&self, key: &str, extract: F) -> Result<Arc<Principal>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Principal, E>>,
    {
        if let Some(entry) = self.entries.get(key) {
            trace!(key_len = key.len(), "principal cache hit");
            return Ok(entry.value().clone());
        }

        let principal = Arc::new(extract().await?);
        debug!(principal = %principal.id, "principal cache insert");
        self.entries.insert(key.to_string(), principal.clone());
        Ok(principal)
    }

    /// Look up a principal without extracting on miss.
    pub fn get(&self, key: &str) -> Option<Arc<Principal>> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    /// Drop the entry for `key`, if present.
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached principals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn principal(id: &str) -> Principal {
        Principal::builder(id).build().unwrap()
    }

    #[tokio::test]
    async fn second_call_does_not_extract_again() {
        let cache = PrincipalCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let got: Result<_, ()> = cache
                .get_or_extract("Bearer abc", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(principal("alice"))
                })
                .await;
            assert_eq!(got.unwrap().id, "alice");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = PrincipalCache::new();
        let calls = AtomicUsize::new(0);

        let first: Result<Arc<Principal>, &str> = cache
            .get_or_extract("ApiKey bogus", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("invalid")
            })
            .await;
        assert!(first.is_err());
        assert!(cache.is_empty());

        let second: Result<Arc<Principal>, &str> = cache
            .get_or_extract("ApiKey bogus", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(principal("svc"))
            })
            .await;
        assert_eq!(second.unwrap().id, "svc");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_misses_converge_to_one_entry() {
        let cache = Arc::new(PrincipalCache::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let got: Result<_, ()> = cache
                    .get_or_extract("Basic dXNlcjpwYXNz", || async {
                        tokio::task::yield_now().await;
                        Ok(principal("user"))
                    })
                    .await;
                got.unwrap().id.clone()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "user");
        }
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_re_extraction() {
        let cache = PrincipalCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let _: Result<_, ()> = cache
                .get_or_extract("token", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(principal("bob"))
                })
                .await;
            cache.invalidate("token");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }
}
