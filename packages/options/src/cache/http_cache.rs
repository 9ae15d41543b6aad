//! In-memory cache strategy built from a `cache` configuration mapping
//!
//! Storage is a lock-free crossbeam `SkipMap` keyed by the request hash;
//! counters are atomics so a strategy can be shared by every record that
//! carries it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use bytes::Bytes;
use crossbeam_skiplist::SkipMap;
use http::{Method, Request, Response};

use super::{Cache, CacheConfig, CacheEntry, CacheKey, Fetch};
use crate::error::Result;
use crate::value::JsonMap;

/// Hit/miss counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
}

impl CacheStats {
    /// `(hits, misses, evictions)`
    pub fn snapshot(&self) -> (u64, u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.evictions.load(Ordering::Relaxed),
        )
    }
}

/// Caching strategy for `GET` responses.
///
/// `memory_usage` only ever moves by the size of an entry this cache itself
/// inserted or removed, so it stays exact when the strategy is shared across
/// threads.
#[derive(Debug)]
pub struct HttpCache {
    entries: SkipMap<String, CacheEntry>,
    config: CacheConfig,
    memory_usage: AtomicU64,
    next_id: AtomicU64,
    stats: CacheStats,
}

impl HttpCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: SkipMap::new(),
            config,
            memory_usage: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
            stats: CacheStats::default(),
        }
    }

    /// Builds a strategy from the plain mapping form of the `cache` option.
    pub fn from_mapping(map: &JsonMap) -> Result<Self> {
        CacheConfig::from_mapping(map).map(Self::new)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn memory_usage(&self) -> u64 {
        self.memory_usage.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        while let Some(entry) = self.entries.pop_front() {
            self.release(entry.value());
        }
    }

    fn lookup(&self, key: &str) -> Option<Response<Bytes>> {
        let entry = self.entries.get(key)?;
        if entry.value().is_fresh(Instant::now()) {
            return Some(entry.value().to_response());
        }
        if entry.remove() {
            self.release(entry.value());
        }
        None
    }

    fn store(&self, key: String, response: &Response<Bytes>) {
        if self.config.max_entries == 0 {
            return;
        }
        let Some(mut entry) = CacheEntry::from_response(response, self.config.default_ttl) else {
            return;
        };
        if entry.size_bytes > self.config.max_memory_bytes {
            return;
        }
        entry.id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.remove(&key);
        while self.entries.len() >= self.config.max_entries
            || self.memory_usage().saturating_add(entry.size_bytes) > self.config.max_memory_bytes
        {
            if !self.evict_oldest() {
                break;
            }
        }

        let (id, size_bytes) = (entry.id, entry.size_bytes);
        // counted before it becomes visible so a concurrent remove never
        // subtracts more than was added
        self.memory_usage.fetch_add(size_bytes, Ordering::Relaxed);
        let stored = self.entries.get_or_insert(key, entry);
        if stored.value().id != id {
            // another writer stored this key first
            self.memory_usage.fetch_sub(size_bytes, Ordering::Relaxed);
            return;
        }

        tracing::debug!(
            target: "quyc::cache",
            key = %stored.key(),
            size_bytes,
            "Cache stored response"
        );
    }

    fn remove(&self, key: &str) {
        if let Some(removed) = self.entries.remove(key) {
            self.release(removed.value());
        }
    }

    fn release(&self, entry: &CacheEntry) {
        self.memory_usage
            .fetch_sub(entry.size_bytes, Ordering::Relaxed);
    }

    fn evict_oldest(&self) -> bool {
        let Some(oldest) = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().created_at)
        else {
            return false;
        };

        if oldest.remove() {
            self.release(oldest.value());
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(target: "quyc::cache", key = %oldest.key(), "Cache evicted oldest entry");
        }
        true
    }
}

impl Cache for HttpCache {
    fn name(&self) -> &str {
        "http"
    }

    fn perform(&self, request: &Request<Bytes>, fetch: Fetch<'_>) -> Result<Response<Bytes>> {
        if request.method() != Method::GET {
            return fetch(request);
        }

        let key = CacheKey::from_request(request).hash_key();
        if let Some(response) = self.lookup(&key) {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(target: "quyc::cache", key = %key, "Cache hit");
            return Ok(response);
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        let response = fetch(request)?;
        self.store(key, &response);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::StatusCode;
    use http::header::CACHE_CONTROL;

    use super::*;

    fn get(uri: &str) -> Request<Bytes> {
        Request::get(uri).body(Bytes::new()).expect("test request builds")
    }

    fn origin(
        body: &'static str,
        cache_control: Option<&'static str>,
    ) -> impl FnMut(&Request<Bytes>) -> Result<Response<Bytes>> {
        move |_| {
            let mut builder = Response::builder().status(StatusCode::OK);
            if let Some(value) = cache_control {
                builder = builder.header(CACHE_CONTROL, value);
            }
            Ok(builder.body(Bytes::from_static(body.as_bytes())).expect("test response builds"))
        }
    }

    #[test]
    fn serves_repeat_gets_from_store() {
        let cache = HttpCache::new(CacheConfig::default());
        let mut calls = 0;
        let mut upstream = origin("fresh", None);
        let mut fetch = |request: &Request<Bytes>| {
            calls += 1;
            upstream(request)
        };

        for _ in 0..3 {
            let response = cache.perform(&get("http://a.com/x"), &mut fetch).expect("perform");
            assert_eq!(response.body(), &Bytes::from_static(b"fresh"));
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.stats().snapshot(), (2, 1, 0));
    }

    #[test]
    fn bypasses_non_get_and_no_store() {
        let cache = HttpCache::new(CacheConfig::default());
        let post = Request::post("http://a.com/x").body(Bytes::new()).expect("test request builds");

        cache.perform(&post, &mut origin("posted", None)).expect("perform");
        cache
            .perform(&get("http://a.com/private"), &mut origin("secret", Some("no-store")))
            .expect("perform");

        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_entries_are_refetched() {
        let cache = HttpCache::new(CacheConfig {
            default_ttl: Duration::ZERO,
            ..CacheConfig::default()
        });
        let mut calls = 0;
        let mut upstream = origin("again", None);
        let mut fetch = |request: &Request<Bytes>| {
            calls += 1;
            upstream(request)
        };

        cache.perform(&get("http://a.com/x"), &mut fetch).expect("perform");
        cache.perform(&get("http://a.com/x"), &mut fetch).expect("perform");

        assert_eq!(calls, 2);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let cache = HttpCache::new(CacheConfig {
            max_entries: 1,
            ..CacheConfig::default()
        });

        cache.perform(&get("http://a.com/1"), &mut origin("one", None)).expect("perform");
        cache.perform(&get("http://a.com/2"), &mut origin("two", None)).expect("perform");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().snapshot().2, 1);

        let mut unreachable = |_: &Request<Bytes>| -> Result<Response<Bytes>> {
            panic!("second entry should be served from the store")
        };
        let response = cache.perform(&get("http://a.com/2"), &mut unreachable).expect("perform");
        assert_eq!(response.body(), &Bytes::from_static(b"two"));
    }

    fn stored_bytes(cache: &HttpCache) -> u64 {
        cache.entries.iter().map(|entry| entry.value().size_bytes).sum()
    }

    #[test]
    fn memory_usage_stays_exact_across_threads() {
        let cache = HttpCache::new(CacheConfig {
            max_entries: 8,
            ..CacheConfig::default()
        });

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let cache = &cache;
                scope.spawn(move || {
                    for round in 0..200 {
                        let uri = format!("http://a.com/{}", (worker + round) % 12);
                        cache.perform(&get(&uri), &mut origin("shared body", None)).expect("perform");
                        if round % 50 == 0 {
                            cache.clear();
                        }
                    }
                });
            }
        });

        assert!(cache.len() <= 12);
        assert_eq!(cache.memory_usage(), stored_bytes(&cache));

        cache.clear();
        assert_eq!(cache.memory_usage(), 0);
    }

    #[test]
    fn replacing_a_key_keeps_one_entry_accounted() {
        let cache = HttpCache::new(CacheConfig {
            default_ttl: Duration::ZERO,
            ..CacheConfig::default()
        });

        cache.perform(&get("http://a.com/x"), &mut origin("first", None)).expect("perform");
        cache.perform(&get("http://a.com/x"), &mut origin("second body", None)).expect("perform");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.memory_usage(), stored_bytes(&cache));
    }

    #[test]
    fn clear_resets_memory() {
        let cache = HttpCache::new(CacheConfig::default());
        cache.perform(&get("http://a.com/x"), &mut origin("body", None)).expect("perform");
        assert!(cache.memory_usage() > 0);

        cache.clear();
        assert_eq!(cache.memory_usage(), 0);
        assert!(cache.is_empty());
    }
}
