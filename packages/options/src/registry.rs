//! Option registry
//!
//! The static, ordered list of every option an [`Options`] record carries.
//! Each entry pairs a name with the interpreter applied by
//! [`Options::with`] before the value reaches the record's write path. The
//! order here is the order of [`Options::to_map`].

use std::fmt;

use crate::error::Result;
use crate::options::{Options, setters};
use crate::value::OptionValue;

/// `with_<name>` interpreter: raw value plus the receiver, to the value that
/// is written.
pub type Coerce = fn(OptionValue, &Options) -> Result<OptionValue>;

/// A declared option.
#[derive(Clone, Copy)]
pub struct OptionDescriptor {
    name: &'static str,
    coerce: Coerce,
}

impl OptionDescriptor {
    const fn declare(name: &'static str) -> Self {
        Self {
            name,
            coerce: identity,
        }
    }

    const fn declare_with(name: &'static str, coerce: Coerce) -> Self {
        Self { name, coerce }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn coerce(&self, raw: OptionValue, current: &Options) -> Result<OptionValue> {
        (self.coerce)(raw, current)
    }
}

impl fmt::Debug for OptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn identity(value: OptionValue, _current: &Options) -> Result<OptionValue> {
    Ok(value)
}

/// Every registered option, in registration order.
pub static OPTIONS: [OptionDescriptor; 17] = [
    OptionDescriptor::declare_with("headers", setters::merge_headers),
    OptionDescriptor::declare("proxy"),
    OptionDescriptor::declare("params"),
    OptionDescriptor::declare("form"),
    OptionDescriptor::declare("json"),
    OptionDescriptor::declare("body"),
    OptionDescriptor::declare("follow"),
    OptionDescriptor::declare("response"),
    OptionDescriptor::declare("socket_factory"),
    OptionDescriptor::declare("ssl_socket_factory"),
    OptionDescriptor::declare("ssl_context"),
    OptionDescriptor::declare("ssl"),
    OptionDescriptor::declare("persistent"),
    OptionDescriptor::declare("keep_alive_timeout"),
    OptionDescriptor::declare("timeout_strategy"),
    OptionDescriptor::declare("timeout_options"),
    OptionDescriptor::declare("cache"),
];

pub fn descriptor(name: &str) -> Option<&'static OptionDescriptor> {
    OPTIONS.iter().find(|descriptor| descriptor.name == name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    OPTIONS.iter().map(|descriptor| descriptor.name)
}

pub fn is_registered(name: &str) -> bool {
    descriptor(name).is_some()
}
