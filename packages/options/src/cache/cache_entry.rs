//! Stored response with freshness metadata

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::CACHE_CONTROL;
use http::{HeaderMap, Response, StatusCode, Version};

/// Longest time an entry stays fresh, whatever `max-age` or the configured
/// TTL ask for.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Cached response entry with metadata
#[derive(Debug)]
pub struct CacheEntry {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub version: Version,
    /// Cache creation timestamp
    pub created_at: Instant,
    /// Instant after which the entry is stale
    pub expires_at: Instant,
    /// Times this entry answered a request
    pub hit_count: AtomicU64,
    /// Size in bytes for memory management
    pub size_bytes: u64,
    /// Store-assigned sequence number, distinguishes entries under one key
    pub id: u64,
}

impl CacheEntry {
    /// Snapshot of `response`, or `None` when the response may not be stored.
    ///
    /// Only `200 OK` responses without `no-store`/`no-cache`/`private` are
    /// kept; `max-age` overrides `default_ttl`. Either is capped at
    /// [`MAX_TTL`].
    pub fn from_response(response: &Response<Bytes>, default_ttl: Duration) -> Option<Self> {
        if response.status() != StatusCode::OK {
            return None;
        }

        let mut ttl = default_ttl;
        for directive in cache_directives(response.headers()) {
            match directive.split_once('=') {
                Some(("max-age", seconds)) => {
                    ttl = Duration::from_secs(seconds.trim_matches('"').parse().ok()?);
                }
                None if matches!(directive.as_str(), "no-store" | "no-cache" | "private") => {
                    return None;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let expires_at = now.checked_add(ttl.min(MAX_TTL))?;
        let body = response.body().clone();
        let size_bytes = body.len() as u64 + response.headers().len() as u64 * 64; // Estimate header overhead

        Some(Self {
            status: response.status(),
            headers: response.headers().clone(),
            body,
            version: response.version(),
            created_at: now,
            expires_at,
            hit_count: AtomicU64::new(0),
            size_bytes,
            id: 0,
        })
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// Rebuilds a response and counts the hit.
    pub fn to_response(&self) -> Response<Bytes> {
        self.hit_count.fetch_add(1, Ordering::Relaxed);

        let mut response = Response::new(self.body.clone());
        *response.status_mut() = self.status;
        *response.version_mut() = self.version;
        *response.headers_mut() = self.headers.clone();
        response
    }
}

fn cache_directives(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(CACHE_CONTROL)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|directive| directive.trim().to_ascii_lowercase())
        .filter(|directive| !directive.is_empty())
        .collect()
}
