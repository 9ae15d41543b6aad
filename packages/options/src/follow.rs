//! Redirect-follow policy
//!
//! A record never holds an un-vetted follow value: raw input is turned into
//! one of three variants when it is written, and `Custom` can only be built
//! from something that supports keyed lookup.

use serde_json::Value;

use crate::error::{self, Result, UnsupportedValue};
use crate::value::{JsonMap, OptionValue};

/// Hops allowed before a redirect chain is abandoned.
pub const DEFAULT_MAX_HOPS: u64 = 5;

/// How the client follows redirects.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FollowPolicy {
    /// Redirects are returned to the caller.
    #[default]
    None,
    /// Follow with default parameters.
    Default,
    /// Follow with caller-supplied parameters.
    Custom(FollowOptions),
}

impl FollowPolicy {
    /// Interprets a raw follow value.
    ///
    /// - null or `false` → `None`
    /// - `true` → `Default`
    /// - a mapping (or an existing policy) → `Custom` / pass-through
    /// - anything else fails with a configuration error
    pub fn from_value(value: OptionValue) -> Result<Self> {
        match value {
            value if value.is_falsy() => Ok(FollowPolicy::None),
            OptionValue::Json(Value::Bool(true)) => Ok(FollowPolicy::Default),
            OptionValue::Json(Value::Object(map)) => Ok(FollowPolicy::Custom(FollowOptions(map))),
            OptionValue::Follow(policy) => Ok(policy),
            other => Err(error::configuration(UnsupportedValue::new("follow", other))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, FollowPolicy::None)
    }

    /// Parameters in effect, `None` when following is disabled.
    pub fn options(&self) -> Option<FollowOptions> {
        match self {
            FollowPolicy::None => None,
            FollowPolicy::Default => Some(FollowOptions::default()),
            FollowPolicy::Custom(options) => Some(options.clone()),
        }
    }
}

/// Keyed follow parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowOptions(JsonMap);

impl FollowOptions {
    pub fn new(map: JsonMap) -> Self {
        Self(map)
    }

    /// Looks up a raw parameter.
    pub fn fetch(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Maximum redirect hops; `max` is accepted as an alias of `max_hops`.
    pub fn max_hops(&self) -> u64 {
        self.fetch("max_hops")
            .or_else(|| self.fetch("max"))
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_MAX_HOPS)
    }

    /// Whether 301/302 redirects of non-GET requests are refused rather than
    /// rewritten to GET.
    pub fn strict(&self) -> bool {
        self.fetch("strict").and_then(Value::as_bool).unwrap_or(true)
    }

    pub fn as_map(&self) -> &JsonMap {
        &self.0
    }
}

impl From<JsonMap> for FollowOptions {
    fn from(map: JsonMap) -> Self {
        Self(map)
    }
}
