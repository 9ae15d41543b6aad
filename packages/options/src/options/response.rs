use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{self, Error, Result, UnsupportedValue};
use crate::value::OptionValue;

/// How the client shapes a response for the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResponseMode {
    /// Decide from the request's verb and payload.
    #[default]
    Auto,
    /// Only the body.
    Body,
    /// The full response object.
    Object,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Auto => "auto",
            ResponseMode::Body => "body",
            ResponseMode::Object => "object",
        }
    }

    pub(crate) fn from_value(value: OptionValue) -> Result<Self> {
        match value {
            OptionValue::Response(mode) => Ok(mode),
            OptionValue::Json(Value::String(name)) => name.parse(),
            other => Err(error::configuration(UnsupportedValue::new("response", other))),
        }
    }
}

impl FromStr for ResponseMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(ResponseMode::Auto),
            "body" => Ok(ResponseMode::Body),
            "object" => Ok(ResponseMode::Object),
            other => Err(error::configuration(UnsupportedValue::new("response", other))),
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
