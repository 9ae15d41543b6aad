//! Origin extraction for persistent connections
//!
//! Parsing is delegated to `url::Url`; this module keeps only the
//! (scheme, host, port) triple and drops path, query and fragment.

use std::fmt;

use serde_json::Value;
use url::Url;

use crate::error::{self, InvalidUri, Result};
use crate::value::OptionValue;

/// Connection endpoint without path or query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    scheme: String,
    host: String,
    port: u16,
}

impl Origin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            host: host.into().to_ascii_lowercase(),
            port,
        }
    }

    /// Parses `input` and keeps its origin.
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input).map_err(|e| error::invalid_uri(InvalidUri::Parse(e)))?;
        Self::from_url(&url)
    }

    pub fn from_url(url: &Url) -> Result<Self> {
        let host = url
            .host_str()
            .ok_or_else(|| error::invalid_uri(InvalidUri::MissingHost(url.to_string())))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| error::invalid_uri(InvalidUri::MissingPort(url.to_string())))?;

        Ok(Self::new(url.scheme(), host, port))
    }

    /// Interprets a raw `persistent` value: falsy disables persistence,
    /// strings are parsed as URIs, origins pass through.
    pub fn from_value(value: OptionValue) -> Result<Option<Self>> {
        match value {
            value if value.is_falsy() => Ok(None),
            OptionValue::Json(Value::String(uri)) => Self::parse(&uri).map(Some),
            OptionValue::Origin(origin) => Ok(Some(origin)),
            other => Err(error::invalid_uri(InvalidUri::Shape(other.to_string()))),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn is_default_port(&self) -> bool {
        default_port(&self.scheme) == Some(self.port)
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        "ftp" => Some(21),
        _ => None,
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if !self.is_default_port() {
            write!(f, ":{}", self.port)?;
        }
        Ok(())
    }
}
