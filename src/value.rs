use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::Bytes;
use indexmap::{IndexMap, IndexSet};

use crate::{CodecError, Result};

/// Insertion-ordered map used for `Value::Map`.
pub type ValueMap = IndexMap<Value, Value>;
/// Insertion-ordered set used for `Value::Set`.
pub type ValueSet = IndexSet<Value>;

/// A dynamically-typed value that can cross the boundary.
///
/// Each variant maps to exactly one wire tag. Rust values are turned into a `Value`
/// explicitly, through the `From`/`TryFrom` conversions below or `#[derive(IntoValue)]`.
///
/// Floats compare and hash by bit pattern, so every `Value` is `Eq + Hash` and can be
/// used as a map key. Set and map equality ignores order.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    ByteArray(Bytes),
    Int32Array(Vec<i32>),
    Int64Array(Vec<i64>),
    Float32Array(Vec<f32>),
    Float64Array(Vec<f64>),
    List(Vec<Value>),
    Set(ValueSet),
    Map(ValueMap),
}

/// The variant of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int32,
    Int64,
    Float64,
    String,
    ByteArray,
    Int32Array,
    Int64Array,
    Float32Array,
    Float64Array,
    List,
    Set,
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "Null",
            ValueKind::Bool => "Bool",
            ValueKind::Int32 => "Int32",
            ValueKind::Int64 => "Int64",
            ValueKind::Float64 => "Float64",
            ValueKind::String => "String",
            ValueKind::ByteArray => "ByteArray",
            ValueKind::Int32Array => "Int32Array",
            ValueKind::Int64Array => "Int64Array",
            ValueKind::Float32Array => "Float32Array",
            ValueKind::Float64Array => "Float64Array",
            ValueKind::List => "List",
            ValueKind::Set => "Set",
            ValueKind::Map => "Map",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Builds the narrowest integer variant holding `value`: `Int32` when it fits,
    /// `Int64` otherwise.
    pub fn integer(value: i64) -> Self {
        match i32::try_from(value) {
            Ok(v) => Value::Int32(v),
            Err(_) => Value::Int64(value),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::Float64(_) => ValueKind::Float64,
            Value::String(_) => ValueKind::String,
            Value::ByteArray(_) => ValueKind::ByteArray,
            Value::Int32Array(_) => ValueKind::Int32Array,
            Value::Int64Array(_) => ValueKind::Int64Array,
            Value::Float32Array(_) => ValueKind::Float32Array,
            Value::Float64Array(_) => ValueKind::Float64Array,
            Value::List(_) => ValueKind::List,
            Value::Set(_) => ValueKind::Set,
            Value::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the integer, widening `Int32`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::ByteArray(v) => Some(&v[..]),
            _ => None,
        }
    }

    pub fn as_i32_array(&self) -> Option<&[i32]> {
        match self {
            Value::Int32Array(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_i64_array(&self) -> Option<&[i64]> {
        match self {
            Value::Int64Array(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_f32_array(&self) -> Option<&[f32]> {
        match self {
            Value::Float32Array(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_f64_array(&self) -> Option<&[f64]> {
        match self {
            Value::Float64Array(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&ValueSet> {
        match self {
            Value::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a map.
    pub fn get(&self, key: impl Into<Value>) -> Option<&Value> {
        self.as_map()?.get(&key.into())
    }
}

fn same_bits<T: Copy, B: PartialEq>(a: &[T], b: &[T], bits: impl Fn(T) -> B) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| bits(*x) == bits(*y))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::ByteArray(a), Value::ByteArray(b)) => a == b,
            (Value::Int32Array(a), Value::Int32Array(b)) => a == b,
            (Value::Int64Array(a), Value::Int64Array(b)) => a == b,
            (Value::Float32Array(a), Value::Float32Array(b)) => {
                same_bits(a.as_slice(), b.as_slice(), f32::to_bits)
            }
            (Value::Float64Array(a), Value::Float64Array(b)) => {
                same_bits(a.as_slice(), b.as_slice(), f64::to_bits)
            }
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::Int32(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::Float64(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::ByteArray(v) => v.hash(state),
            Value::Int32Array(v) => v.hash(state),
            Value::Int64Array(v) => v.hash(state),
            Value::Float32Array(v) => {
                v.len().hash(state);
                v.iter().for_each(|x| x.to_bits().hash(state));
            }
            Value::Float64Array(v) => {
                v.len().hash(state);
                v.iter().for_each(|x| x.to_bits().hash(state));
            }
            Value::List(v) => v.hash(state),
            Value::Set(v) => {
                v.len().hash(state);
                unordered_hash(v.iter()).hash(state);
            }
            Value::Map(v) => {
                v.len().hash(state);
                unordered_hash(v.iter()).hash(state);
            }
        }
    }
}

/// Combines element hashes with a wrapping sum so that iteration order does not matter,
/// matching the order-independent equality of sets and maps.
fn unordered_hash<T: Hash>(items: impl Iterator<Item = T>) -> u64 {
    items.fold(0u64, |acc, item| {
        let mut hasher = DefaultHasher::new();
        item.hash(&mut hasher);
        acc.wrapping_add(hasher.finish())
    })
}

// --- Scalar conversions ---
macro_rules! impl_from_int32 {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int32(value as i32)
                }
            }
        )*
    };
}

impl_from_int32!(i8, i16, i32, u8, u16);

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

/// `u32` values above `i32::MAX` become `Int64`.
impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::integer(value as i64)
    }
}

/// Pointer-sized integers use `Int32` when the value fits.
impl From<isize> for Value {
    fn from(value: isize) -> Self {
        Value::integer(value as i64)
    }
}

macro_rules! impl_try_from_wide {
    ($($ty:ty),*) => {
        $(
            /// Fails with `UnsupportedType` outside the `Int64` range.
            impl TryFrom<$ty> for Value {
                type Error = CodecError;

                fn try_from(value: $ty) -> Result<Self> {
                    i64::try_from(value).map(Value::integer).map_err(|_| {
                        CodecError::UnsupportedType(format!(
                            "{} value {} does not fit in Int64",
                            stringify!($ty),
                            value
                        ))
                    })
                }
            }
        )*
    };
}

impl_try_from_wide!(u64, usize, i128, u128);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float64(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// --- Strings and bytes ---
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::ByteArray(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::ByteArray(Bytes::from(value))
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::ByteArray(Bytes::copy_from_slice(value))
    }
}

// --- Typed arrays ---
impl From<Vec<i32>> for Value {
    fn from(value: Vec<i32>) -> Self {
        Value::Int32Array(value)
    }
}

impl From<Vec<i64>> for Value {
    fn from(value: Vec<i64>) -> Self {
        Value::Int64Array(value)
    }
}

impl From<Vec<f32>> for Value {
    fn from(value: Vec<f32>) -> Self {
        Value::Float32Array(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::Float64Array(value)
    }
}

// --- Collections ---
impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value.into_iter().map(Value::String).collect())
    }
}

/// Collects into a `List`.
impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Value::List(iter.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<IndexSet<T>> for Value {
    fn from(value: IndexSet<T>) -> Self {
        Value::Set(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<HashSet<T>> for Value {
    fn from(value: HashSet<T>) -> Self {
        Value::Set(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeSet<T>> for Value {
    fn from(value: BTreeSet<T>) -> Self {
        Value::Set(value.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<Value>, V: Into<Value>> From<IndexMap<K, V>> for Value {
    fn from(value: IndexMap<K, V>) -> Self {
        Value::Map(
            value
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<Value>, V: Into<Value>> From<HashMap<K, V>> for Value {
    fn from(value: HashMap<K, V>) -> Self {
        Value::Map(
            value
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(value: BTreeMap<K, V>) -> Self {
        Value::Map(
            value
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
