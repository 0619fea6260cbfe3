//! # result-channel
//!
//! A compact, self-describing binary encoding for moving dynamically-typed values
//! across a foreign-function boundary.
//!
//! - Every value is a one-byte tag followed by its payload
//! - Multi-byte scalars and typed arrays are aligned to their element size, so the
//!   receiving side can read them in place
//! - Lengths use a variable-width size field (1, 3 or 5+ bytes including padding)
//! - Multi-byte values use the host's native byte order
//!
//! ## Wire Tags
//!
//! | Tag    | Variant        | Payload                                   |
//! |--------|----------------|-------------------------------------------|
//! | `0x00` | `Null`         | none                                      |
//! | `0x01` | `Bool(true)`   | none                                      |
//! | `0x02` | `Bool(false)`  | none                                      |
//! | `0x03` | `Int32`        | 4 bytes, 4-aligned                        |
//! | `0x04` | `Int64`        | 8 bytes, 8-aligned                        |
//! | `0x05` | `Float64`      | 8 bytes, 8-aligned                        |
//! | `0x06` | `String`       | size + UTF-8 bytes                        |
//! | `0x07` | `ByteArray`    | size + raw bytes                          |
//! | `0x08` | `Int32Array`   | size + packed elements, 4-aligned         |
//! | `0x09` | `Int64Array`   | size + packed elements, 8-aligned         |
//! | `0x0A` | `Float32Array` | size + packed elements, 4-aligned         |
//! | `0x0B` | `Float64Array` | size + packed elements, 8-aligned         |
//! | `0x0C` | `List`         | size + values                             |
//! | `0x0D` | `Set`          | size + values                             |
//! | `0x0E` | `Map`          | size + key/value pairs                    |
//!
//! ## Feature Flags
//!
//! - `serde_json`: Enables conversions between `serde_json::Value` and [`Value`].
//!
//! ## Derive
//!
//! - `#[derive(IntoValue)]`: Implements `From<T> for Value`. Named structs become maps
//!   keyed by field name, tuple structs become lists, unit structs become `Null` and
//!   fieldless enums become the variant name.
//! - `#[value(rename = "name")]`: Use a different map key (or enum string) for a field/variant.
//! - `#[value(skip)]`: Leave the field out of the produced value.

pub mod channel;
pub mod core;
mod features;
pub mod reader;
pub mod value;
pub mod writer;

pub use crate::channel::{result_channel_free, Callback, ResultChannel, ResultNative, ResultStatus};
pub use crate::core::Codec;
pub use crate::reader::Reader;
pub use crate::value::{Value, ValueKind, ValueMap, ValueSet};
pub use crate::writer::Writer;
pub use bytes::Bytes;
pub use result_channel_derive::IntoValue;

/// Errors that can occur during encoding or decoding operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A host value has no representation in the wire format (e.g. an unsigned
    /// integer above `i64::MAX`).
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    /// An undefined tag byte was found.
    #[error("Message corrupted: unknown tag 0x{tag:02X} at offset {position}")]
    CorruptStream { tag: u8, position: usize },
    /// A read would run past the end of the input.
    #[error("Insufficient data: need {needed} bytes at offset {position}, {available} available")]
    OutOfBounds {
        position: usize,
        needed: usize,
        available: usize,
    },
    /// A map key has no counterpart in a conversion target, such as a non-string key
    /// converted to a JSON object.
    #[error("{kind} cannot be used as a map key in the target representation")]
    InvalidKey { kind: ValueKind },
    /// A string payload is not valid UTF-8.
    #[error("Invalid UTF-8 in string payload: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    /// A four-byte size field holds a negative value.
    #[error("Invalid size field: {0}")]
    InvalidSize(i32),
    /// A length does not fit the four-byte size field.
    #[error("Length {0} exceeds the maximum encodable size")]
    SizeOverflow(usize),
    /// Containers are nested deeper than the codec allows.
    #[error("Nesting depth exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}

/// The result type used throughout this crate for encode/decode operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Convenience function to serialize a value with the default [`Codec`].
///
/// # Example
/// ```rust
/// use result_channel::{deserialize, serialize, Value};
///
/// let value = Value::List(vec![Value::Null, Value::from(42), Value::from("hi")]);
/// let bytes = serialize(&value).unwrap();
/// assert_eq!(deserialize(&bytes).unwrap(), value);
/// ```
pub fn serialize(value: &Value) -> Result<Bytes> {
    Codec::default().serialize(value)
}

/// Convenience function to deserialize one value with the default [`Codec`].
///
/// Bytes after the first complete value are ignored.
pub fn deserialize(bytes: &[u8]) -> Result<Value> {
    Codec::default().deserialize(bytes)
}
