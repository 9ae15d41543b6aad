//! Raw and stored option values
//!
//! `OptionValue` is the single currency flowing through the registry: callers
//! hand raw values to `Options::new` / `with_*`, coercions turn them into the
//! typed field, and `Options::get` / `to_map` hand them back out. Plain data
//! travels as `serde_json::Value`; capabilities travel as `Arc<dyn ...>` and
//! compare by identity.
//!
//! `OptionMap` is the ordered name→value mapping used for partial input and
//! for serialization.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::cache::Cache;
use crate::connect::{SocketFactory, TlsSocketFactory};
use crate::follow::FollowPolicy;
use crate::options::ResponseMode;
use crate::timeout::TimeoutStrategy;
use crate::uri::Origin;

/// JSON object used for opaque option mappings (proxy, ssl, timeout options).
pub type JsonMap = Map<String, Value>;

/// A raw or stored option value.
#[derive(Debug, Clone)]
pub enum OptionValue {
    /// Plain data: null, booleans, numbers, strings, arrays and mappings.
    Json(Value),
    Headers(HeaderMap),
    Duration(Duration),
    Response(ResponseMode),
    Follow(FollowPolicy),
    Origin(Origin),
    Cache(Arc<dyn Cache>),
    SocketFactory(Arc<dyn SocketFactory>),
    TlsSocketFactory(Arc<dyn TlsSocketFactory>),
    TlsConfig(Arc<rustls::ClientConfig>),
    TimeoutStrategy(Arc<dyn TimeoutStrategy>),
}

impl OptionValue {
    /// The unset value.
    pub const NULL: OptionValue = OptionValue::Json(Value::Null);

    pub fn cache(cache: impl Cache + 'static) -> Self {
        OptionValue::Cache(Arc::new(cache))
    }

    pub fn socket_factory(factory: impl SocketFactory + 'static) -> Self {
        OptionValue::SocketFactory(Arc::new(factory))
    }

    pub fn tls_socket_factory(factory: impl TlsSocketFactory + 'static) -> Self {
        OptionValue::TlsSocketFactory(Arc::new(factory))
    }

    pub fn timeout_strategy(strategy: impl TimeoutStrategy + 'static) -> Self {
        OptionValue::TimeoutStrategy(Arc::new(strategy))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, OptionValue::Json(Value::Null))
    }

    /// Null or `false`.
    pub fn is_falsy(&self) -> bool {
        matches!(self, OptionValue::Json(Value::Null | Value::Bool(false)))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            OptionValue::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        use OptionValue::*;

        match (self, other) {
            (Json(a), Json(b)) => a == b,
            (Headers(a), Headers(b)) => a == b,
            (Duration(a), Duration(b)) => a == b,
            (Response(a), Response(b)) => a == b,
            (Follow(a), Follow(b)) => a == b,
            (Origin(a), Origin(b)) => a == b,
            (Cache(a), Cache(b)) => Arc::ptr_eq(a, b),
            (SocketFactory(a), SocketFactory(b)) => Arc::ptr_eq(a, b),
            (TlsSocketFactory(a), TlsSocketFactory(b)) => Arc::ptr_eq(a, b),
            (TlsConfig(a), TlsConfig(b)) => Arc::ptr_eq(a, b),
            (TimeoutStrategy(a), TimeoutStrategy(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Json(value) => write!(f, "{value}"),
            OptionValue::Headers(headers) => write!(f, "{headers:?}"),
            OptionValue::Duration(duration) => write!(f, "{duration:?}"),
            OptionValue::Response(mode) => f.write_str(mode.as_str()),
            OptionValue::Follow(policy) => write!(f, "{policy:?}"),
            OptionValue::Origin(origin) => write!(f, "{origin}"),
            OptionValue::Cache(cache) => write!(f, "#<cache {}>", cache.name()),
            OptionValue::SocketFactory(factory) => write!(f, "#<socket {}>", factory.name()),
            OptionValue::TlsSocketFactory(factory) => {
                write!(f, "#<tls socket {}>", factory.name())
            }
            OptionValue::TlsConfig(_) => f.write_str("#<tls config>"),
            OptionValue::TimeoutStrategy(strategy) => {
                write!(f, "#<timeout {}>", strategy.name())
            }
        }
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Json(value) => value.serialize(serializer),
            OptionValue::Headers(headers) => {
                let mut map = serializer.serialize_map(Some(headers.keys_len()))?;
                for name in headers.keys() {
                    let values: Vec<String> = headers
                        .get_all(name)
                        .iter()
                        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                        .collect();
                    map.serialize_entry(name.as_str(), &values)?;
                }
                map.end()
            }
            OptionValue::Duration(duration) => serializer.serialize_f64(duration.as_secs_f64()),
            OptionValue::Response(mode) => serializer.serialize_str(mode.as_str()),
            OptionValue::Follow(policy) => match policy {
                FollowPolicy::None => serializer.serialize_none(),
                FollowPolicy::Default => serializer.serialize_bool(true),
                FollowPolicy::Custom(options) => options.as_map().serialize(serializer),
            },
            OptionValue::Origin(origin) => serializer.collect_str(origin),
            OptionValue::Cache(cache) => serializer.serialize_str(cache.name()),
            OptionValue::SocketFactory(factory) => serializer.serialize_str(factory.name()),
            OptionValue::TlsSocketFactory(factory) => serializer.serialize_str(factory.name()),
            OptionValue::TlsConfig(_) => serializer.serialize_str("rustls"),
            OptionValue::TimeoutStrategy(strategy) => serializer.serialize_str(strategy.name()),
        }
    }
}

impl From<Value> for OptionValue {
    fn from(value: Value) -> Self {
        OptionValue::Json(value)
    }
}

impl From<JsonMap> for OptionValue {
    fn from(map: JsonMap) -> Self {
        OptionValue::Json(Value::Object(map))
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Json(Value::Bool(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Json(Value::String(value.to_owned()))
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Json(Value::String(value))
    }
}

impl From<&url::Url> for OptionValue {
    fn from(url: &url::Url) -> Self {
        OptionValue::Json(Value::String(url.as_str().to_owned()))
    }
}

macro_rules! from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for OptionValue {
                fn from(value: $ty) -> Self {
                    OptionValue::Json(Value::from(value))
                }
            }
        )*
    };
}

from_number!(i32, i64, u32, u64, f64);

impl From<Duration> for OptionValue {
    fn from(duration: Duration) -> Self {
        OptionValue::Duration(duration)
    }
}

impl From<HeaderMap> for OptionValue {
    fn from(headers: HeaderMap) -> Self {
        OptionValue::Headers(headers)
    }
}

impl From<ResponseMode> for OptionValue {
    fn from(mode: ResponseMode) -> Self {
        OptionValue::Response(mode)
    }
}

impl From<FollowPolicy> for OptionValue {
    fn from(policy: FollowPolicy) -> Self {
        OptionValue::Follow(policy)
    }
}

impl From<Origin> for OptionValue {
    fn from(origin: Origin) -> Self {
        OptionValue::Origin(origin)
    }
}

impl From<Arc<dyn Cache>> for OptionValue {
    fn from(cache: Arc<dyn Cache>) -> Self {
        OptionValue::Cache(cache)
    }
}

impl From<Arc<dyn SocketFactory>> for OptionValue {
    fn from(factory: Arc<dyn SocketFactory>) -> Self {
        OptionValue::SocketFactory(factory)
    }
}

impl From<Arc<dyn TlsSocketFactory>> for OptionValue {
    fn from(factory: Arc<dyn TlsSocketFactory>) -> Self {
        OptionValue::TlsSocketFactory(factory)
    }
}

impl From<Arc<rustls::ClientConfig>> for OptionValue {
    fn from(config: Arc<rustls::ClientConfig>) -> Self {
        OptionValue::TlsConfig(config)
    }
}

impl From<Arc<dyn TimeoutStrategy>> for OptionValue {
    fn from(strategy: Arc<dyn TimeoutStrategy>) -> Self {
        OptionValue::TimeoutStrategy(strategy)
    }
}

impl<T: Into<OptionValue>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(OptionValue::NULL, Into::into)
    }
}

/// Ordered option-name → value mapping.
///
/// Inserting an existing name replaces its value in place, so the order is
/// the order in which names were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionMap {
    entries: Vec<(String, OptionValue)>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts `value`, returning the value it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Option<OptionValue> {
        let name = name.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, name: &str) -> Option<OptionValue> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl IntoIterator for OptionMap {
    type Item = (String, OptionValue);
    type IntoIter = std::vec::IntoIter<(String, OptionValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OptionMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<OptionValue>> Extend<(K, V)> for OptionMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<K: Into<String>, V: Into<OptionValue>, const N: usize> From<[(K, V); N]> for OptionMap {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Lifts a JSON object (e.g. parsed from a config file) into option input.
impl From<JsonMap> for OptionMap {
    fn from(map: JsonMap) -> Self {
        map.into_iter().collect()
    }
}

impl Serialize for OptionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cache::NullCache;

    #[test]
    fn insert_replaces_in_place() {
        let mut map = OptionMap::new().with("proxy", json!({})).with("follow", true);
        let previous = map.insert("proxy", json!({"proxy_address": "127.0.0.1"}));

        assert_eq!(previous, Some(OptionValue::Json(json!({}))));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["proxy", "follow"]);
    }

    #[test]
    fn falsy_values() {
        assert!(OptionValue::NULL.is_falsy());
        assert!(OptionValue::from(false).is_falsy());
        assert!(!OptionValue::from(true).is_falsy());
        assert!(!OptionValue::from(0).is_falsy());
        assert!(OptionValue::from(None::<bool>).is_null());
    }

    #[test]
    fn capabilities_compare_by_identity() {
        let cache: Arc<dyn Cache> = Arc::new(NullCache);
        let same = OptionValue::Cache(Arc::clone(&cache));

        assert_eq!(OptionValue::Cache(cache), same);
        assert_ne!(same, OptionValue::cache(NullCache));
    }

    #[test]
    fn lifts_json_objects() {
        let map = OptionMap::from(
            json!({"follow": true, "keep_alive_timeout": 10})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        );

        assert_eq!(map.get("follow"), Some(&OptionValue::from(true)));
        assert_eq!(map.get("keep_alive_timeout"), Some(&OptionValue::from(10)));
    }
}
