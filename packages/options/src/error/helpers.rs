use thiserror::Error;

/// An option received a value it has no interpretation for.
///
/// The message is the full human-readable reason, e.g.
/// `Unsupported follow options: 42`.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UnsupportedValue(pub String);

impl UnsupportedValue {
    pub fn new(option: &str, value: impl std::fmt::Display) -> Self {
        Self(format!("Unsupported {option} options: {value}"))
    }
}

/// A header name or value could not be represented.
#[derive(Debug, Error)]
pub enum InvalidHeader {
    #[error("invalid header name {0:?}")]
    Name(String),
    #[error("invalid value for header {name:?}")]
    Value { name: String },
    #[error("unsupported header input: {0}")]
    Shape(String),
}

/// A URI had no usable origin.
#[derive(Debug, Error)]
pub enum InvalidUri {
    #[error(transparent)]
    Parse(#[from] url::ParseError),
    #[error("uri {0:?} has no host")]
    MissingHost(String),
    #[error("uri {0:?} has no port and no known default for its scheme")]
    MissingPort(String),
    #[error("unsupported persistent value: {0}")]
    Shape(String),
}
