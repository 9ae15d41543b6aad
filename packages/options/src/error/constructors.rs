use super::BoxError;
use super::types::{Error, Kind};

/// Creates an `Error` for a write to an unregistered option name.
pub fn unknown_option(name: impl Into<String>) -> Error {
    Error::new(Kind::UnknownOption(name.into()))
}

/// Creates an `Error` for an option value of unsupported shape.
pub fn configuration<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Configuration).with(e.into())
}

/// Creates an `Error` for a header that failed coercion.
pub fn invalid_header<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::InvalidHeader).with(e.into())
}

/// Creates an `Error` for a persistent origin that failed to parse.
pub fn invalid_uri<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::InvalidUri).with(e.into())
}
