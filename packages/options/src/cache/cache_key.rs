//! Cache key generation and hashing for HTTP requests
//!
//! Provides CacheKey for generating consistent cache keys based on
//! request URL, method, and cache-relevant headers.

use std::hash::{DefaultHasher, Hash, Hasher};

use bytes::Bytes;
use http::Request;

/// Headers whose value changes which stored response is valid.
const KEYED_HEADERS: [&str; 4] = ["accept", "accept-encoding", "accept-language", "authorization"];

/// Cache key for HTTP responses based on URL and headers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request URL
    pub url: String,
    /// `(name, value)` of keyed headers, in `KEYED_HEADERS` order
    pub cache_headers: Vec<(String, String)>,
}

impl CacheKey {
    pub fn from_request(request: &Request<Bytes>) -> Self {
        let headers = request.headers();
        let cache_headers = KEYED_HEADERS
            .iter()
            .flat_map(|name| {
                headers.get_all(*name).iter().map(move |value| {
                    (
                        (*name).to_owned(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
            })
            .collect();

        Self {
            method: request.method().as_str().to_owned(),
            url: request.uri().to_string(),
            cache_headers,
        }
    }

    /// Generate hash key for storage
    pub fn hash_key(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }
}
