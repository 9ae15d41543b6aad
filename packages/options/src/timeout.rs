//! Timeout strategies
//!
//! The `timeout_strategy` option names how deadlines are derived and the
//! `timeout_options` mapping carries the strategy's parameters. Strategies
//! only resolve deadlines; enforcing them belongs to the transport.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::{self, Result, UnsupportedValue};
use crate::value::JsonMap;

/// Per-operation deadlines applied when a strategy does not get one.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(250);

/// Resolved deadlines; `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Option<Duration>,
    pub read: Option<Duration>,
    pub write: Option<Duration>,
    /// Bound on the whole request, spanning all operations.
    pub global: Option<Duration>,
}

/// Timeout strategy capability.
pub trait TimeoutStrategy: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Resolves deadlines from the `timeout_options` mapping.
    fn timeouts(&self, options: &JsonMap) -> Result<Timeouts>;
}

/// No deadlines at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTimeout;

impl TimeoutStrategy for NullTimeout {
    fn name(&self) -> &str {
        "null"
    }

    fn timeouts(&self, _options: &JsonMap) -> Result<Timeouts> {
        Ok(Timeouts::default())
    }
}

/// Separate connect, read and write deadlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerOperationTimeout;

impl TimeoutStrategy for PerOperationTimeout {
    fn name(&self) -> &str {
        "per_operation"
    }

    fn timeouts(&self, options: &JsonMap) -> Result<Timeouts> {
        Ok(Timeouts {
            connect: Some(seconds(options, "connect_timeout")?.unwrap_or(DEFAULT_OPERATION_TIMEOUT)),
            read: Some(seconds(options, "read_timeout")?.unwrap_or(DEFAULT_OPERATION_TIMEOUT)),
            write: Some(seconds(options, "write_timeout")?.unwrap_or(DEFAULT_OPERATION_TIMEOUT)),
            global: None,
        })
    }
}

/// One deadline for the whole request.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalTimeout;

impl TimeoutStrategy for GlobalTimeout {
    fn name(&self) -> &str {
        "global"
    }

    fn timeouts(&self, options: &JsonMap) -> Result<Timeouts> {
        let global = seconds(options, "global_timeout")?.ok_or_else(|| {
            error::configuration(UnsupportedValue(
                "global timeout strategy requires global_timeout".to_owned(),
            ))
        })?;

        Ok(Timeouts {
            connect: seconds(options, "connect_timeout")?,
            read: None,
            write: None,
            global: Some(global),
        })
    }
}

/// Looks up a built-in strategy by its `name()`.
pub fn by_name(name: &str) -> Option<Arc<dyn TimeoutStrategy>> {
    match name {
        "null" => Some(Arc::new(NullTimeout)),
        "per_operation" => Some(Arc::new(PerOperationTimeout)),
        "global" => Some(Arc::new(GlobalTimeout)),
        _ => None,
    }
}

/// Non-negative, finite number of seconds.
pub(crate) fn duration_from_json(value: &Value) -> Option<Duration> {
    let seconds = value.as_f64()?;
    Duration::try_from_secs_f64(seconds).ok()
}

fn seconds(options: &JsonMap, key: &str) -> Result<Option<Duration>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => duration_from_json(value).map(Some).ok_or_else(|| {
            error::configuration(UnsupportedValue(format!("{key} must be seconds, got {value}")))
        }),
    }
}
