use bytes::Bytes;
use tracing::{debug, trace};

use crate::value::{Value, ValueMap, ValueSet};
use crate::writer::DEFAULT_CAPACITY;
use crate::*;

/// Type tags used in the binary format.
///
/// These tags are written as the first byte of each encoded value. They are part of
/// the wire format and shared by every implementation of it.
pub const TAG_NULL: u8 = 0x00;
pub const TAG_TRUE: u8 = 0x01;
pub const TAG_FALSE: u8 = 0x02;
pub const TAG_INT32: u8 = 0x03;
pub const TAG_INT64: u8 = 0x04;
pub const TAG_FLOAT64: u8 = 0x05;
pub const TAG_STRING: u8 = 0x06;
pub const TAG_BYTE_ARRAY: u8 = 0x07;
pub const TAG_INT32_ARRAY: u8 = 0x08;
pub const TAG_INT64_ARRAY: u8 = 0x09;
pub const TAG_FLOAT32_ARRAY: u8 = 0x0A;
pub const TAG_FLOAT64_ARRAY: u8 = 0x0B;
pub const TAG_LIST: u8 = 0x0C;
pub const TAG_SET: u8 = 0x0D;
pub const TAG_MAP: u8 = 0x0E;

///< Size field marker: a 2-byte size follows
pub const SIZE_U16: u8 = 0xFE;
///< Size field marker: a 4-byte size follows
pub const SIZE_I32: u8 = 0xFF;
pub const MAX_U16_SIZE: usize = 0xFFFF;

/// Default limit on container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Number of zero bytes needed to move `position` to a multiple of `alignment`.
#[inline]
pub fn padding_for(position: usize, alignment: usize) -> usize {
    (alignment - position % alignment) % alignment
}

// --- Size field ---
/// Writes a length using the variable-width size field.
///
/// - `0..=253` is written as one byte
/// - `254..=65535` is written as `0xFE` followed by a 2-aligned `u16`
/// - Anything larger is written as `0xFF` followed by a 4-aligned `i32`
///
/// # Arguments
/// * `writer` - The buffer to append the size field to.
/// * `size` - Element count or byte length to encode.
///
/// # Errors
/// Returns `SizeOverflow` if `size` exceeds `i32::MAX`.
pub fn write_size(writer: &mut Writer, size: usize) -> Result<()> {
    if size < SIZE_U16 as usize {
        writer.write_u8(size as u8);
    } else if size <= MAX_U16_SIZE {
        writer.write_u8(SIZE_U16);
        writer.write_u16(size as u16);
    } else {
        let size = i32::try_from(size).map_err(|_| CodecError::SizeOverflow(size))?;
        writer.write_u8(SIZE_I32);
        writer.write_i32(size);
    }
    Ok(())
}

/// Reads a length written by [`write_size`].
///
/// # Arguments
/// * `reader` - The cursor positioned at the first byte of the size field.
///
/// # Returns
/// The decoded length. The cursor is left after the field, including any padding.
///
/// # Errors
/// Returns `OutOfBounds` if the field is truncated and `InvalidSize` if a four-byte
/// size is negative.
pub fn read_size(reader: &mut Reader<'_>) -> Result<usize> {
    match reader.read_u8()? {
        SIZE_U16 => Ok(reader.read_u16()? as usize),
        SIZE_I32 => {
            let size = reader.read_i32()?;
            usize::try_from(size).map_err(|_| CodecError::InvalidSize(size))
        }
        small => Ok(small as usize),
    }
}

/// Serializer/deserializer for [`Value`] trees.
///
/// `Codec` carries the settings of the encoding; it holds no state between calls, so
/// one instance can be shared freely.
///
/// # Example
/// ```rust
/// use result_channel::{Codec, Value};
///
/// let codec = Codec::new().with_initial_capacity(64);
/// let bytes = codec.serialize(&Value::from(vec![1.5f64, 2.5])).unwrap();
/// assert_eq!(codec.deserialize(&bytes).unwrap(), Value::Float64Array(vec![1.5, 2.5]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    initial_capacity: usize,
    max_depth: usize,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    pub const fn new() -> Self {
        Codec {
            initial_capacity: DEFAULT_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the capacity each serialize call starts its writer with.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Sets how many levels of List/Set/Map nesting are accepted.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Serializes `value` into a freshly allocated buffer.
    ///
    /// # Arguments
    /// * `value` - The value tree to encode.
    ///
    /// # Returns
    /// Exactly the encoded bytes, with no spare capacity exposed.
    ///
    /// # Errors
    /// Returns `SizeOverflow` for a length above `i32::MAX` and `DepthLimitExceeded`
    /// when containers nest deeper than [`Codec::max_depth`]. On error no output is
    /// produced.
    pub fn serialize(&self, value: &Value) -> Result<Bytes> {
        let mut writer = Writer::with_capacity(self.initial_capacity);
        self.append(&mut writer, value)?;
        let bytes = writer.finish();
        debug!(len = bytes.len(), kind = %value.kind(), "serialized value");
        Ok(bytes)
    }

    /// Deserializes exactly one value from the start of `bytes`.
    ///
    /// Bytes after the first complete value are ignored.
    ///
    /// # Arguments
    /// * `bytes` - The encoded region. It is only borrowed for the call.
    ///
    /// # Errors
    /// Returns `CorruptStream` for an unknown tag, `OutOfBounds` for truncated input,
    /// `InvalidUtf8`, `InvalidSize` or `DepthLimitExceeded`. No partial value is
    /// returned.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        let mut reader = Reader::new(bytes);
        let value = self.read(&mut reader)?;
        if reader.remaining() > 0 {
            trace!(trailing = reader.remaining(), "ignoring bytes after value");
        }
        debug!(len = bytes.len(), kind = %value.kind(), "deserialized value");
        Ok(value)
    }

    /// Appends the tag and payload of `value` to `writer`.
    ///
    /// # Arguments
    /// * `writer` - The buffer to append to. Earlier contents are kept.
    /// * `value` - The value tree to encode.
    pub fn append(&self, writer: &mut Writer, value: &Value) -> Result<()> {
        self.append_at(writer, value, 0)
    }

    /// Reads one tagged value from `reader`.
    ///
    /// # Arguments
    /// * `reader` - The cursor positioned at a tag byte. It is left after the value.
    pub fn read(&self, reader: &mut Reader<'_>) -> Result<Value> {
        self.read_at(reader, 0)
    }

    fn enter(&self, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            return Err(CodecError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn append_at(&self, writer: &mut Writer, value: &Value, depth: usize) -> Result<()> {
        match value {
            Value::Null => writer.write_u8(TAG_NULL),
            Value::Bool(true) => writer.write_u8(TAG_TRUE),
            Value::Bool(false) => writer.write_u8(TAG_FALSE),
            Value::Int32(v) => {
                writer.write_u8(TAG_INT32);
                writer.write_i32(*v);
            }
            Value::Int64(v) => {
                writer.write_u8(TAG_INT64);
                writer.write_i64(*v);
            }
            Value::Float64(v) => {
                writer.write_u8(TAG_FLOAT64);
                writer.write_f64(*v);
            }
            Value::String(s) => {
                writer.write_u8(TAG_STRING);
                write_size(writer, s.len())?;
                writer.write_bytes(s.as_bytes());
            }
            Value::ByteArray(b) => {
                writer.write_u8(TAG_BYTE_ARRAY);
                write_size(writer, b.len())?;
                writer.write_bytes(b);
            }
            Value::Int32Array(v) => {
                writer.write_u8(TAG_INT32_ARRAY);
                write_size(writer, v.len())?;
                writer.write_i32_array(v);
            }
            Value::Int64Array(v) => {
                writer.write_u8(TAG_INT64_ARRAY);
                write_size(writer, v.len())?;
                writer.write_i64_array(v);
            }
            Value::Float32Array(v) => {
                writer.write_u8(TAG_FLOAT32_ARRAY);
                write_size(writer, v.len())?;
                writer.write_f32_array(v);
            }
            Value::Float64Array(v) => {
                writer.write_u8(TAG_FLOAT64_ARRAY);
                write_size(writer, v.len())?;
                writer.write_f64_array(v);
            }
            Value::List(items) => {
                self.enter(depth)?;
                writer.write_u8(TAG_LIST);
                write_size(writer, items.len())?;
                for item in items {
                    self.append_at(writer, item, depth + 1)?;
                }
            }
            Value::Set(members) => {
                self.enter(depth)?;
                writer.write_u8(TAG_SET);
                write_size(writer, members.len())?;
                for member in members {
                    self.append_at(writer, member, depth + 1)?;
                }
            }
            Value::Map(entries) => {
                self.enter(depth)?;
                writer.write_u8(TAG_MAP);
                write_size(writer, entries.len())?;
                for (key, value) in entries {
                    self.append_at(writer, key, depth + 1)?;
                    self.append_at(writer, value, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn read_at(&self, reader: &mut Reader<'_>, depth: usize) -> Result<Value> {
        let position = reader.position();
        let tag = reader.read_u8()?;
        let value = match tag {
            TAG_NULL => Value::Null,
            TAG_TRUE => Value::Bool(true),
            TAG_FALSE => Value::Bool(false),
            TAG_INT32 => Value::Int32(reader.read_i32()?),
            TAG_INT64 => Value::Int64(reader.read_i64()?),
            TAG_FLOAT64 => Value::Float64(reader.read_f64()?),
            TAG_STRING => {
                let len = read_size(reader)?;
                Value::String(reader.read_str(len)?.to_owned())
            }
            TAG_BYTE_ARRAY => {
                let len = read_size(reader)?;
                Value::ByteArray(Bytes::copy_from_slice(reader.read_bytes(len)?))
            }
            TAG_INT32_ARRAY => {
                let len = read_size(reader)?;
                Value::Int32Array(reader.read_i32_array(len)?)
            }
            TAG_INT64_ARRAY => {
                let len = read_size(reader)?;
                Value::Int64Array(reader.read_i64_array(len)?)
            }
            TAG_FLOAT32_ARRAY => {
                let len = read_size(reader)?;
                Value::Float32Array(reader.read_f32_array(len)?)
            }
            TAG_FLOAT64_ARRAY => {
                let len = read_size(reader)?;
                Value::Float64Array(reader.read_f64_array(len)?)
            }
            TAG_LIST => {
                self.enter(depth)?;
                let len = read_size(reader)?;
                // Every element takes at least one byte.
                let mut items = Vec::with_capacity(len.min(reader.remaining()));
                for _ in 0..len {
                    items.push(self.read_at(reader, depth + 1)?);
                }
                Value::List(items)
            }
            TAG_SET => {
                self.enter(depth)?;
                let len = read_size(reader)?;
                let mut members = ValueSet::with_capacity(len.min(reader.remaining()));
                for _ in 0..len {
                    members.insert(self.read_at(reader, depth + 1)?);
                }
                Value::Set(members)
            }
            TAG_MAP => {
                self.enter(depth)?;
                let len = read_size(reader)?;
                let mut entries = ValueMap::with_capacity(len.min(reader.remaining() / 2));
                for _ in 0..len {
                    let key = self.read_at(reader, depth + 1)?;
                    let value = self.read_at(reader, depth + 1)?;
                    entries.insert(key, value);
                }
                Value::Map(entries)
            }
            other => return Err(CodecError::CorruptStream { tag: other, position }),
        };
        Ok(value)
    }
}
