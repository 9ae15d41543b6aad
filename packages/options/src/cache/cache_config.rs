//! Cache configuration and the mapping form accepted by the `cache` option

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{self, Result};
use crate::value::JsonMap;

/// Cache configuration and limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries in cache
    pub max_entries: usize,
    /// Maximum memory usage in bytes
    pub max_memory_bytes: u64,
    /// TTL for responses without an explicit `max-age`
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            max_memory_bytes: 100 * 1024 * 1024,   // 100MB
            default_ttl: Duration::from_secs(300), // 5 minutes
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CacheSettings {
    ttl: Option<u64>,
    max_entries: Option<usize>,
    max_memory_bytes: Option<u64>,
}

impl CacheConfig {
    /// Reads `{ttl, max_entries, max_memory_bytes}`; missing keys keep their
    /// defaults and unknown keys are rejected.
    pub fn from_mapping(map: &JsonMap) -> Result<Self> {
        let settings: CacheSettings =
            serde_json::from_value(Value::Object(map.clone())).map_err(error::configuration)?;
        let defaults = Self::default();

        Ok(Self {
            max_entries: settings.max_entries.unwrap_or(defaults.max_entries),
            max_memory_bytes: settings.max_memory_bytes.unwrap_or(defaults.max_memory_bytes),
            default_ttl: settings
                .ttl
                .map_or(defaults.default_ttl, Duration::from_secs),
        })
    }
}
