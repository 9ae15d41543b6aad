//! Header coercion and merge
//!
//! Every header set stored in an options record has passed through
//! [`coerce`]. Names are case-insensitive (`http` lowercases them) and a name
//! may carry several values.

use http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::{self, InvalidHeader, Result};
use crate::value::OptionValue;

/// Normalizes a raw header-like value.
///
/// Accepted shapes: an existing `HeaderMap`, null (no headers), a JSON object
/// mapping names to a scalar or an array of scalars, or a JSON array of
/// `[name, value]` pairs.
pub fn coerce(value: OptionValue) -> Result<HeaderMap> {
    match value {
        OptionValue::Headers(headers) => Ok(headers),
        OptionValue::Json(Value::Null) => Ok(HeaderMap::new()),
        OptionValue::Json(Value::Object(map)) => {
            let mut headers = HeaderMap::with_capacity(map.len());
            for (name, value) in &map {
                append(&mut headers, name, value)?;
            }
            Ok(headers)
        }
        OptionValue::Json(Value::Array(pairs)) => {
            let mut headers = HeaderMap::with_capacity(pairs.len());
            for pair in &pairs {
                match pair.as_array().map(Vec::as_slice) {
                    Some([Value::String(name), value]) => append(&mut headers, name, value)?,
                    _ => {
                        return Err(error::invalid_header(InvalidHeader::Shape(
                            pair.to_string(),
                        )));
                    }
                }
            }
            Ok(headers)
        }
        other => Err(error::invalid_header(InvalidHeader::Shape(other.to_string()))),
    }
}

/// Returns `base` with every name present in `overlay` replaced by the
/// overlay's values. Names only in `base` are kept.
pub fn merge(base: &HeaderMap, overlay: &HeaderMap) -> HeaderMap {
    let mut merged = base.clone();
    for name in overlay.keys() {
        merged.remove(name);
        for value in overlay.get_all(name) {
            merged.append(name.clone(), value.clone());
        }
    }
    merged
}

fn append(headers: &mut HeaderMap, name: &str, value: &Value) -> Result<()> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| error::invalid_header(InvalidHeader::Name(name.to_owned())))?;

    match value {
        Value::Array(values) => {
            for value in values {
                headers.append(header_name.clone(), header_value(name, value)?);
            }
        }
        value => {
            headers.append(header_name, header_value(name, value)?);
        }
    }

    Ok(())
}

fn header_value(name: &str, value: &Value) -> Result<HeaderValue> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => {
            return Err(error::invalid_header(InvalidHeader::Value {
                name: name.to_owned(),
            }));
        }
    };

    HeaderValue::from_str(&text).map_err(|_| {
        error::invalid_header(InvalidHeader::Value {
            name: name.to_owned(),
        })
    })
}
