//! The options record
//!
//! [`Options`] holds one typed slot per registered option. It is never
//! mutated after construction: every `with_*` call and [`Options::merge`]
//! return a new record and leave the receiver untouched.
//!
//! Plain data (headers, proxy/ssl/timeout mappings, payloads) is owned by each
//! record, so a successor never observes changes made through its
//! predecessor. Capabilities (cache, socket factories, timeout strategy, TLS
//! context) are shared through `Arc` and keep their identity across copies.

use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::cache::Cache;
use crate::connect::{SocketFactory, TlsSocketFactory};
use crate::defaults::{DEFAULT_KEEP_ALIVE_TIMEOUT, Defaults};
use crate::error::{self, Result};
use crate::follow::FollowPolicy;
use crate::headers;
use crate::registry;
use crate::timeout::{TimeoutStrategy, Timeouts};
use crate::uri::Origin;
use crate::value::{JsonMap, OptionMap, OptionValue};

mod response;
pub(crate) mod setters;

pub use response::ResponseMode;

/// HTTP client options.
#[derive(Debug, Clone)]
pub struct Options {
    headers: HeaderMap,
    proxy: JsonMap,
    params: Value,
    form: Value,
    json: Value,
    body: Value,
    follow: FollowPolicy,
    response: ResponseMode,
    socket_factory: Arc<dyn SocketFactory>,
    ssl_socket_factory: Arc<dyn TlsSocketFactory>,
    ssl_context: Option<Arc<rustls::ClientConfig>>,
    ssl: JsonMap,
    persistent: Option<Origin>,
    keep_alive_timeout: Duration,
    timeout_strategy: Arc<dyn TimeoutStrategy>,
    timeout_options: JsonMap,
    cache: Arc<dyn Cache>,
}

/// Input accepted by [`Options::new`].
pub trait IntoOptions {
    fn into_options(self) -> Result<Options>;
}

impl IntoOptions for Options {
    fn into_options(self) -> Result<Options> {
        Ok(self)
    }
}

impl IntoOptions for OptionMap {
    fn into_options(self) -> Result<Options> {
        Options::from_map_with(self, &Defaults::global())
    }
}

impl IntoOptions for JsonMap {
    fn into_options(self) -> Result<Options> {
        OptionMap::from(self).into_options()
    }
}

impl Options {
    /// Builds a record from partial input over the process-wide defaults.
    ///
    /// An existing `Options` is returned unchanged.
    ///
    /// # Errors
    ///
    /// Fails with `Kind::UnknownOption` for a name outside the registry, or
    /// with the error of the first option that rejects its value.
    pub fn new(input: impl IntoOptions) -> Result<Options> {
        input.into_options()
    }

    /// Builds a record from partial input over explicit `defaults`.
    pub fn from_map_with(partial: OptionMap, defaults: &Defaults) -> Result<Options> {
        let mut full = defaults.to_option_map();
        full.extend(partial);

        // headers are normalized before any other option is written
        let headers = headers::coerce(full.remove("headers").unwrap_or(OptionValue::NULL))?;

        let mut options = Options::blank(defaults);
        options.headers = headers;
        for (name, value) in full {
            options.write(&name, value)?;
        }

        Ok(options)
    }

    fn blank(defaults: &Defaults) -> Self {
        Self {
            headers: HeaderMap::new(),
            proxy: JsonMap::new(),
            params: Value::Null,
            form: Value::Null,
            json: Value::Null,
            body: Value::Null,
            follow: FollowPolicy::None,
            response: ResponseMode::Auto,
            socket_factory: Arc::clone(&defaults.socket_factory),
            ssl_socket_factory: Arc::clone(&defaults.ssl_socket_factory),
            ssl_context: None,
            ssl: JsonMap::new(),
            persistent: None,
            keep_alive_timeout: Duration::from_secs(DEFAULT_KEEP_ALIVE_TIMEOUT),
            timeout_strategy: Arc::clone(&defaults.timeout_strategy),
            timeout_options: JsonMap::new(),
            cache: Arc::clone(&defaults.cache),
        }
    }

    /// Internal write path for a single option.
    fn write(&mut self, name: &str, value: OptionValue) -> Result<()> {
        match name {
            "headers" => self.headers = headers::coerce(value)?,
            "proxy" => self.proxy = setters::mapping(name, value)?,
            "params" => self.params = setters::payload(name, value)?,
            "form" => self.form = setters::payload(name, value)?,
            "json" => self.json = setters::payload(name, value)?,
            "body" => self.body = setters::payload(name, value)?,
            "follow" => self.follow = FollowPolicy::from_value(value)?,
            "response" => self.response = ResponseMode::from_value(value)?,
            "socket_factory" => self.socket_factory = setters::socket_factory(value)?,
            "ssl_socket_factory" => self.ssl_socket_factory = setters::ssl_socket_factory(value)?,
            "ssl_context" => self.ssl_context = setters::ssl_context(value)?,
            "ssl" => self.ssl = setters::mapping(name, value)?,
            "persistent" => self.persistent = Origin::from_value(value)?,
            "keep_alive_timeout" => self.keep_alive_timeout = setters::keep_alive_timeout(value)?,
            "timeout_strategy" => self.timeout_strategy = setters::timeout_strategy(value)?,
            "timeout_options" => self.timeout_options = setters::mapping(name, value)?,
            "cache" => self.cache = setters::cache(value)?,
            _ => return Err(error::unknown_option(name)),
        }
        Ok(())
    }

    /// Internal read path; `None` only for unregistered names.
    fn read(&self, name: &str) -> Option<OptionValue> {
        let value = match name {
            "headers" => OptionValue::Headers(self.headers.clone()),
            "proxy" => OptionValue::from(self.proxy.clone()),
            "params" => OptionValue::Json(self.params.clone()),
            "form" => OptionValue::Json(self.form.clone()),
            "json" => OptionValue::Json(self.json.clone()),
            "body" => OptionValue::Json(self.body.clone()),
            "follow" => match self.follow {
                FollowPolicy::None => OptionValue::NULL,
                ref policy => OptionValue::Follow(policy.clone()),
            },
            "response" => OptionValue::Response(self.response),
            "socket_factory" => OptionValue::SocketFactory(Arc::clone(&self.socket_factory)),
            "ssl_socket_factory" => {
                OptionValue::TlsSocketFactory(Arc::clone(&self.ssl_socket_factory))
            }
            "ssl_context" => OptionValue::from(self.ssl_context.clone()),
            "ssl" => OptionValue::from(self.ssl.clone()),
            "persistent" => OptionValue::from(self.persistent.clone()),
            "keep_alive_timeout" => OptionValue::Duration(self.keep_alive_timeout),
            "timeout_strategy" => OptionValue::TimeoutStrategy(Arc::clone(&self.timeout_strategy)),
            "timeout_options" => OptionValue::from(self.timeout_options.clone()),
            "cache" => OptionValue::Cache(Arc::clone(&self.cache)),
            _ => return None,
        };
        Some(value)
    }

    /// Returns a copy of `self` with option `name` set from `value`.
    ///
    /// The value goes through the option's registered interpreter and then its
    /// write path. The receiver is never modified.
    pub fn with(&self, name: &str, value: impl Into<OptionValue>) -> Result<Options> {
        let descriptor = registry::descriptor(name).ok_or_else(|| error::unknown_option(name))?;
        let value = descriptor.coerce(value.into(), self)?;

        let mut next = self.clone();
        next.write(name, value)?;
        Ok(next)
    }

    /// Value of option `name`, or `None` if the name is not registered or the
    /// option is unset.
    ///
    /// Misspelled names are indistinguishable from unset options here; use
    /// [`Options::get_strict`] when that matters.
    pub fn get(&self, name: &str) -> Option<OptionValue> {
        let value = self.read(name).filter(|value| !value.is_null());
        if value.is_none() {
            tracing::trace!(
                target: "quyc::options",
                option = name,
                registered = registry::is_registered(name),
                "Option lookup returned nothing"
            );
        }
        value
    }

    /// Value of option `name`; unset options read as `OptionValue::NULL`.
    ///
    /// # Errors
    ///
    /// Fails with `Kind::UnknownOption` when `name` is not registered.
    pub fn get_strict(&self, name: &str) -> Result<OptionValue> {
        self.read(name).ok_or_else(|| error::unknown_option(name))
    }

    /// Every option in registration order. Feeding the result back into
    /// [`Options::new`] yields an equal record.
    pub fn to_map(&self) -> OptionMap {
        registry::names()
            .filter_map(|name| self.read(name).map(|value| (name, value)))
            .collect()
    }

    /// Combines two records: headers are unioned with `other` winning per
    /// name, every other option set on `other` replaces the one on `self`.
    pub fn merge(&self, other: &Options) -> Result<Options> {
        let mut merged = self.to_map();

        for (name, value) in other.to_map() {
            let value = match name.as_str() {
                "headers" => OptionValue::Headers(headers::merge(&self.headers, &other.headers)),
                _ if value.is_null() => continue,
                _ => value,
            };
            merged.insert(name, value);
        }

        Options::new(merged)
    }

    /// Overrides every option named in `partial`, keyed on presence rather
    /// than value: a null entry clears the option. `headers` are still merged
    /// onto the current headers.
    ///
    /// # Errors
    ///
    /// Fails for names outside the registry or values an option rejects.
    pub fn merge_map(&self, partial: &OptionMap) -> Result<Options> {
        let mut merged = self.to_map();

        for (name, value) in partial.iter() {
            let value = match name {
                "headers" => {
                    let overlay = headers::coerce(value.clone())?;
                    OptionValue::Headers(headers::merge(&self.headers, &overlay))
                }
                _ => value.clone(),
            };
            merged.insert(name, value);
        }

        Options::new(merged)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn proxy(&self) -> &JsonMap {
        &self.proxy
    }

    pub fn params(&self) -> Option<&Value> {
        Some(&self.params).filter(|value| !value.is_null())
    }

    pub fn form(&self) -> Option<&Value> {
        Some(&self.form).filter(|value| !value.is_null())
    }

    pub fn json(&self) -> Option<&Value> {
        Some(&self.json).filter(|value| !value.is_null())
    }

    pub fn body(&self) -> Option<&Value> {
        Some(&self.body).filter(|value| !value.is_null())
    }

    pub fn follow(&self) -> &FollowPolicy {
        &self.follow
    }

    pub fn response(&self) -> ResponseMode {
        self.response
    }

    pub fn socket_factory(&self) -> &Arc<dyn SocketFactory> {
        &self.socket_factory
    }

    pub fn ssl_socket_factory(&self) -> &Arc<dyn TlsSocketFactory> {
        &self.ssl_socket_factory
    }

    pub fn ssl_context(&self) -> Option<&Arc<rustls::ClientConfig>> {
        self.ssl_context.as_ref()
    }

    pub fn ssl(&self) -> &JsonMap {
        &self.ssl
    }

    /// Origin of the persistent connection, when persistence is enabled.
    pub fn persistent(&self) -> Option<&Origin> {
        self.persistent.as_ref()
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent.is_some()
    }

    pub fn keep_alive_timeout(&self) -> Duration {
        self.keep_alive_timeout
    }

    pub fn timeout_strategy(&self) -> &Arc<dyn TimeoutStrategy> {
        &self.timeout_strategy
    }

    pub fn timeout_options(&self) -> &JsonMap {
        &self.timeout_options
    }

    /// Deadlines resolved by the timeout strategy from `timeout_options`.
    pub fn timeouts(&self) -> Result<Timeouts> {
        self.timeout_strategy.timeouts(&self.timeout_options)
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }
}

macro_rules! with_options {
    ($($(#[$doc:meta])* $method:ident => $name:literal;)*) => {
        impl Options {
            $(
                $(#[$doc])*
                pub fn $method(&self, value: impl Into<OptionValue>) -> Result<Options> {
                    self.with($name, value)
                }
            )*
        }
    };
}

with_options! {
    /// Merges `value` onto the current headers; colliding names are replaced.
    with_headers => "headers";
    with_proxy => "proxy";
    with_params => "params";
    with_form => "form";
    with_json => "json";
    with_body => "body";
    /// `false`/null disables following, `true` follows with defaults and a
    /// mapping follows with custom parameters.
    with_follow => "follow";
    with_response => "response";
    with_socket_factory => "socket_factory";
    with_ssl_socket_factory => "ssl_socket_factory";
    with_ssl_context => "ssl_context";
    with_ssl => "ssl";
    /// A URI enables persistence for its origin; `false`/null disables it.
    with_persistent => "persistent";
    with_keep_alive_timeout => "keep_alive_timeout";
    with_timeout_strategy => "timeout_strategy";
    with_timeout_options => "timeout_options";
    /// A cache is stored as-is; a configuration mapping is wrapped in an
    /// `HttpCache`.
    with_cache => "cache";
}

impl Default for Options {
    fn default() -> Self {
        Options::blank(&Defaults::global())
    }
}

impl PartialEq for Options {
    fn eq(&self, other: &Self) -> bool {
        self.to_map() == other.to_map()
    }
}

/// Inspection view: capabilities render as their names.
impl Serialize for Options {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}
