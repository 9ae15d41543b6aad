//! Per-option interpreters
//!
//! Each function turns a raw value into the typed field it is stored as.
//! They are the only way values enter an [`Options`] record.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::Options;
use crate::cache::{Cache, HttpCache, NullCache};
use crate::connect::{SocketFactory, TlsSocketFactory};
use crate::error::{self, Result, UnsupportedValue};
use crate::headers;
use crate::timeout::{self, TimeoutStrategy};
use crate::value::{JsonMap, OptionValue};

/// `with_headers`: layers the coerced input over the receiver's headers.
pub(crate) fn merge_headers(raw: OptionValue, current: &Options) -> Result<OptionValue> {
    let overlay = headers::coerce(raw)?;
    Ok(OptionValue::Headers(headers::merge(current.headers(), &overlay)))
}

/// Opaque mappings (`proxy`, `ssl`, `timeout_options`); null means empty.
pub(super) fn mapping(option: &str, value: OptionValue) -> Result<JsonMap> {
    match value {
        OptionValue::Json(Value::Object(map)) => Ok(map),
        OptionValue::Json(Value::Null) => Ok(JsonMap::new()),
        other => Err(error::configuration(UnsupportedValue::new(option, other))),
    }
}

/// Request payloads (`params`, `form`, `json`, `body`); null means unset.
pub(super) fn payload(option: &str, value: OptionValue) -> Result<Value> {
    match value {
        OptionValue::Json(value) => Ok(value),
        other => Err(error::configuration(UnsupportedValue::new(option, other))),
    }
}

pub(super) fn socket_factory(value: OptionValue) -> Result<Arc<dyn SocketFactory>> {
    match value {
        OptionValue::SocketFactory(factory) => Ok(factory),
        other => Err(error::configuration(UnsupportedValue::new("socket_factory", other))),
    }
}

pub(super) fn ssl_socket_factory(value: OptionValue) -> Result<Arc<dyn TlsSocketFactory>> {
    match value {
        OptionValue::TlsSocketFactory(factory) => Ok(factory),
        other => Err(error::configuration(UnsupportedValue::new(
            "ssl_socket_factory",
            other,
        ))),
    }
}

pub(super) fn ssl_context(value: OptionValue) -> Result<Option<Arc<rustls::ClientConfig>>> {
    match value {
        OptionValue::TlsConfig(config) => Ok(Some(config)),
        OptionValue::Json(Value::Null) => Ok(None),
        other => Err(error::configuration(UnsupportedValue::new("ssl_context", other))),
    }
}

/// Seconds as an integer or float, or a `Duration`.
pub(super) fn keep_alive_timeout(value: OptionValue) -> Result<Duration> {
    let duration = match &value {
        OptionValue::Duration(duration) => Some(*duration),
        OptionValue::Json(json) => timeout::duration_from_json(json),
        _ => None,
    };

    duration.ok_or_else(|| {
        error::configuration(UnsupportedValue::new("keep_alive_timeout", value))
    })
}

/// A strategy, or the name of a built-in one.
pub(super) fn timeout_strategy(value: OptionValue) -> Result<Arc<dyn TimeoutStrategy>> {
    let strategy = match &value {
        OptionValue::TimeoutStrategy(strategy) => Some(Arc::clone(strategy)),
        OptionValue::Json(Value::String(name)) => timeout::by_name(name),
        _ => None,
    };

    strategy.ok_or_else(|| {
        error::configuration(UnsupportedValue::new("timeout_strategy", value))
    })
}

/// Caches pass through untouched; a configuration mapping is wrapped in an
/// [`HttpCache`]; null disables caching.
pub(super) fn cache(value: OptionValue) -> Result<Arc<dyn Cache>> {
    match value {
        OptionValue::Cache(cache) => Ok(cache),
        OptionValue::Json(Value::Null) => Ok(Arc::new(NullCache)),
        OptionValue::Json(Value::Object(map)) => {
            let cache = HttpCache::from_mapping(&map)?;
            tracing::debug!(
                target: "quyc::options",
                max_entries = cache.config().max_entries,
                max_memory_bytes = cache.config().max_memory_bytes,
                ttl_secs = cache.config().default_ttl.as_secs(),
                "Wrapped cache configuration in HttpCache strategy"
            );
            Ok(Arc::new(cache))
        }
        other => Err(error::configuration(UnsupportedValue::new("cache", other))),
    }
}
