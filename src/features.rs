#[cfg(feature = "serde_json")]
use serde_json::{Map, Number, Value as JsonValue};

#[allow(unused_imports)]
use crate::*;

// --- serde_json::Value ---
/// Converts JSON into a [`Value`].
///
/// Integers use `Int32` when they fit and `Int64` otherwise; other numbers become
/// `Float64`. Objects become maps with `String` keys, preserving key order.
///
/// # Errors
/// Returns `UnsupportedType` for integers above `i64::MAX`.
#[cfg(feature = "serde_json")]
impl TryFrom<JsonValue> for Value {
    type Error = CodecError;

    fn try_from(value: JsonValue) -> Result<Self> {
        Ok(match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::integer(i)
                } else if n.is_u64() {
                    return Err(CodecError::UnsupportedType(format!(
                        "JSON number {} does not fit in Int64",
                        n
                    )));
                } else {
                    Value::Float64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            JsonValue::Object(entries) => {
                let mut map = ValueMap::with_capacity(entries.len());
                for (k, v) in entries {
                    map.insert(Value::String(k), Value::try_from(v)?);
                }
                Value::Map(map)
            }
        })
    }
}

#[cfg(feature = "serde_json")]
fn json_float(value: f64) -> Result<JsonValue> {
    Number::from_f64(value)
        .map(JsonValue::Number)
        .ok_or_else(|| CodecError::UnsupportedType(format!("non-finite float {} in JSON", value)))
}

/// Converts a [`Value`] into JSON.
///
/// Byte and numeric arrays become JSON arrays, sets become arrays in iteration order.
///
/// # Errors
/// Returns `UnsupportedType` for NaN or infinite floats and `InvalidKey` for map keys
/// that are not strings.
#[cfg(feature = "serde_json")]
impl TryFrom<Value> for JsonValue {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self> {
        Ok(match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(b),
            Value::Int32(v) => JsonValue::from(v),
            Value::Int64(v) => JsonValue::from(v),
            Value::Float64(v) => json_float(v)?,
            Value::String(s) => JsonValue::String(s),
            Value::ByteArray(b) => {
                JsonValue::Array(b.iter().map(|x| JsonValue::from(*x)).collect())
            }
            Value::Int32Array(v) => JsonValue::Array(v.into_iter().map(JsonValue::from).collect()),
            Value::Int64Array(v) => JsonValue::Array(v.into_iter().map(JsonValue::from).collect()),
            Value::Float32Array(v) => JsonValue::Array(
                v.into_iter()
                    .map(|x| json_float(x as f64))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Float64Array(v) => JsonValue::Array(
                v.into_iter()
                    .map(json_float)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::List(items) => JsonValue::Array(
                items
                    .into_iter()
                    .map(JsonValue::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Set(members) => JsonValue::Array(
                members
                    .into_iter()
                    .map(JsonValue::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Map(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (k, v) in entries {
                    let kind = k.kind();
                    let Value::String(key) = k else {
                        return Err(CodecError::InvalidKey { kind });
                    };
                    map.insert(key, JsonValue::try_from(v)?);
                }
                JsonValue::Object(map)
            }
        })
    }
}
