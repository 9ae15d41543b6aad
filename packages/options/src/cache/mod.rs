//! Pluggable response caching
//!
//! A cache is anything implementing [`Cache`]. The options record stores
//! either a caller-supplied cache unchanged or an [`HttpCache`] built from a
//! plain configuration mapping; the process-wide default is [`NullCache`].

use std::fmt;

use bytes::Bytes;
use http::{Request, Response};

use crate::error::Result;

pub mod cache_config;
pub mod cache_entry;
pub mod cache_key;
pub mod http_cache;

pub use cache_config::CacheConfig;
pub use cache_entry::CacheEntry;
pub use cache_key::CacheKey;
pub use http_cache::{CacheStats, HttpCache};

/// Performs the real round-trip when the cache cannot answer.
pub type Fetch<'a> = &'a mut dyn FnMut(&Request<Bytes>) -> Result<Response<Bytes>>;

/// Response cache capability.
pub trait Cache: fmt::Debug + Send + Sync {
    /// Short identifier used in logs and serialized options.
    fn name(&self) -> &str;

    /// Answers `request` from the cache or through `fetch`.
    fn perform(&self, request: &Request<Bytes>, fetch: Fetch<'_>) -> Result<Response<Bytes>>;
}

/// Cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl Cache for NullCache {
    fn name(&self) -> &str {
        "null"
    }

    fn perform(&self, request: &Request<Bytes>, fetch: Fetch<'_>) -> Result<Response<Bytes>> {
        fetch(request)
    }
}
