use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{PathError, QueryError};
use crate::tree::Field;
use crate::wire::{
    read_packed_fixed32, read_packed_fixed64, read_packed_varint, RawValue, WireType,
};

/// The value type requested by the `:type` suffix of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// The field itself, including its byte range and sub-tree. Legal for every wire type.
    Raw,
    /// Varint as unsigned integer
    Var,
    /// Little-endian signed 32 bit integer
    I32,
    /// Little-endian unsigned 32 bit integer
    U32,
    /// Fixed32 that is not zero
    Bool,
    /// IEEE-754 single precision float
    F32,
    /// Little-endian signed 64 bit integer
    I64,
    /// Little-endian unsigned 64 bit integer
    U64,
    /// IEEE-754 double precision float
    Double,
    /// UTF-8 text. Invalid sequences are replaced by U+FFFD.
    String,
    /// The raw payload
    Bytes,
    /// Packed repeated varints
    PackedVar,
    /// Packed repeated fixed32 values
    Packed32,
    /// Packed repeated fixed64 values
    Packed64,
}

impl ValueType {
    pub const ALL: [ValueType; 14] = [
        ValueType::Raw,
        ValueType::Var,
        ValueType::I32,
        ValueType::U32,
        ValueType::Bool,
        ValueType::F32,
        ValueType::I64,
        ValueType::U64,
        ValueType::Double,
        ValueType::String,
        ValueType::Bytes,
        ValueType::PackedVar,
        ValueType::Packed32,
        ValueType::Packed64,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Raw => "raw",
            ValueType::Var => "var",
            ValueType::I32 => "i32",
            ValueType::U32 => "u32",
            ValueType::Bool => "bool",
            ValueType::F32 => "f32",
            ValueType::I64 => "i64",
            ValueType::U64 => "u64",
            ValueType::Double => "double",
            ValueType::String => "string",
            ValueType::Bytes => "bytes",
            ValueType::PackedVar => "packedvar",
            ValueType::Packed32 => "packed32",
            ValueType::Packed64 => "packed64",
        }
    }

    /// The value types a field of the given wire type can be read as, apart from [`ValueType::Raw`].
    pub fn legal_for(wire_type: WireType) -> &'static [ValueType] {
        match wire_type {
            WireType::Varint => &[ValueType::Var],
            WireType::Fixed64 => &[ValueType::I64, ValueType::U64, ValueType::Double],
            WireType::LengthDelimited => &[
                ValueType::String,
                ValueType::Bytes,
                ValueType::PackedVar,
                ValueType::Packed32,
                ValueType::Packed64,
            ],
            WireType::Fixed32 => &[
                ValueType::I32,
                ValueType::U32,
                ValueType::Bool,
                ValueType::F32,
            ],
        }
    }

    pub fn is_legal_for(self, wire_type: WireType) -> bool {
        match self {
            ValueType::Raw => true,
            ValueType::Var => wire_type == WireType::Varint,
            ValueType::I64 | ValueType::U64 | ValueType::Double => wire_type == WireType::Fixed64,
            ValueType::String
            | ValueType::Bytes
            | ValueType::PackedVar
            | ValueType::Packed32
            | ValueType::Packed64 => wire_type == WireType::LengthDelimited,
            ValueType::I32 | ValueType::U32 | ValueType::Bool | ValueType::F32 => {
                wire_type == WireType::Fixed32
            }
        }
    }
}

impl FromStr for ValueType {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueType::ALL
            .into_iter()
            .find(|value_type| value_type.as_str() == s)
            .ok_or_else(|| PathError::UnknownValueType(s.to_string()))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value extracted by a path query
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Var(u64),
    I32(i32),
    U32(u32),
    Bool(bool),
    F32(f32),
    I64(i64),
    U64(u64),
    Double(f64),
    String(Cow<'a, str>),
    Bytes(&'a [u8]),
    PackedVar(Vec<u64>),
    Packed32(Vec<u32>),
    Packed64(Vec<u64>),
    Raw(Field<'a>),
}

impl<'a> Value<'a> {
    /// Reads the field as the given value type.
    ///
    /// Fails with [`QueryError::IncompatibleType`] if the value type is not legal for the
    /// field's wire type, and with [`QueryError::Decode`] if a packed payload is malformed.
    pub fn coerce(field: &Field<'a>, value_type: ValueType) -> Result<Self, QueryError> {
        let value = match (value_type, field.value()) {
            (ValueType::Raw, _) => Value::Raw(field.to_complete()),
            (ValueType::Var, RawValue::Varint(v)) => Value::Var(v),
            (ValueType::I64, RawValue::Fixed64(b)) => Value::I64(i64::from_le_bytes(b)),
            (ValueType::U64, RawValue::Fixed64(b)) => Value::U64(u64::from_le_bytes(b)),
            (ValueType::Double, RawValue::Fixed64(b)) => Value::Double(f64::from_le_bytes(b)),
            (ValueType::I32, RawValue::Fixed32(b)) => Value::I32(i32::from_le_bytes(b)),
            (ValueType::U32, RawValue::Fixed32(b)) => Value::U32(u32::from_le_bytes(b)),
            (ValueType::Bool, RawValue::Fixed32(b)) => Value::Bool(u32::from_le_bytes(b) != 0),
            (ValueType::F32, RawValue::Fixed32(b)) => Value::F32(f32::from_le_bytes(b)),
            (ValueType::String, RawValue::LengthDelimited(p)) => {
                Value::String(String::from_utf8_lossy(p))
            }
            (ValueType::Bytes, RawValue::LengthDelimited(p)) => Value::Bytes(p),
            (ValueType::PackedVar, RawValue::LengthDelimited(p)) => {
                Value::PackedVar(read_packed_varint(p)?)
            }
            (ValueType::Packed32, RawValue::LengthDelimited(p)) => {
                Value::Packed32(read_packed_fixed32(p)?)
            }
            (ValueType::Packed64, RawValue::LengthDelimited(p)) => {
                Value::Packed64(read_packed_fixed64(p)?)
            }
            (requested, raw) => {
                let wire_type = raw.wire_type();
                return Err(QueryError::IncompatibleType {
                    wire_type,
                    requested,
                    legal: ValueType::legal_for(wire_type),
                });
            }
        };
        Ok(value)
    }

    /// Integer values widened to u64. None for floats, bools, text and sequences.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::Var(v) | Value::U64(v) => Some(v),
            Value::U32(v) => Some(v.into()),
            Value::I32(v) => v.try_into().ok(),
            Value::I64(v) => v.try_into().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            Value::Bytes(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&Field<'a>> {
        match self {
            Value::Raw(field) => Some(field),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Var(v) | Value::U64(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "\"{}\"", b.escape_ascii()),
            Value::PackedVar(v) | Value::Packed64(v) => write!(f, "{v:?}"),
            Value::Packed32(v) => write!(f, "{v:?}"),
            Value::Raw(field) => write!(
                f,
                "field {} ({}) at {:?}",
                field.number(),
                field.wire_type(),
                field.range()
            ),
        }
    }
}
