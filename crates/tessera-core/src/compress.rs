//! Positional-array helpers for the compact transport encoding
//!
//! Compressed values are fixed-arity JSON arrays. Decoders match the exact
//! shape before touching any element so malformed input fails up front.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TesseraError;

/// Borrow the elements of a compressed value, checking its arity
pub fn expect_array<'a>(
    value: &'a Value,
    what: &'static str,
    arity: usize,
) -> Result<&'a [Value], TesseraError> {
    match value {
        Value::Array(items) if items.len() == arity => Ok(items.as_slice()),
        Value::Array(items) => Err(TesseraError::Arity {
            what,
            expected: arity,
            actual: items.len(),
        }),
        other => Err(TesseraError::Structural(format!(
            "compressed {} must be an array, got {}",
            what,
            json_kind(other)
        ))),
    }
}

/// Decode one positional field
pub fn field<T: DeserializeOwned>(
    items: &[Value],
    index: usize,
    what: &'static str,
) -> Result<T, TesseraError> {
    let item = items.get(index).ok_or_else(|| {
        TesseraError::Structural(format!("compressed {} is missing field {}", what, index))
    })?;
    serde_json::from_value(item.clone()).map_err(|e| {
        TesseraError::Structural(format!("compressed {} field {}: {}", what, index, e))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
