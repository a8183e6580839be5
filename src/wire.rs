//! Low level readers for the protobuf wire format.
//!
//! <https://protobuf.dev/programming-guides/encoding/#structure>

use std::fmt;

use crate::error::DecodeError;
use crate::slice_reader::SliceReader;
use crate::varint::read_unsigned_varint;

/// The protobuf wire types understood by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable length field (int32, int64, uint32, uint64, sint32, sint64, bool, enum)
    Varint = 0,
    /// 64-bit value (fixed64, sfixed64, double)
    Fixed64 = 1,
    /// Lengths prefixed field (string, bytes, embedded messages, packed repeated fields)
    LengthDelimited = 2,
    // group start/end (deprecated, unsupported)
    // SGROUP = 3,
    // EGROUP = 4,
    /// 32-bit value (fixed32, sfixed32, float)
    Fixed32 = 5,
}

impl WireType {
    /// Maps the lower three bits of a tag to a wire type.
    /// Returns None for groups and reserved values.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Varint => "VARINT",
            Self::Fixed64 => "FIXED64",
            Self::LengthDelimited => "LENGTH_DELIMITED",
            Self::Fixed32 => "FIXED32",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), *self as u8)
    }
}

/// An undecoded field value. The variant always matches the field's wire type.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RawValue<'a> {
    /// Unknown varint (wire type = 0).
    Varint(u64),

    /// A 64-bit value (wire type = 1). Used for fixed64, sfixed64, double.
    Fixed64([u8; 8]),

    /// Unknown variable length value (wire type = 2).
    LengthDelimited(&'a [u8]),

    /// A 32-bit value (wire type = 5). Used for fixed32, sfixed32, float.
    Fixed32([u8; 4]),
}

impl RawValue<'_> {
    pub fn wire_type(&self) -> WireType {
        match self {
            RawValue::Varint(_) => WireType::Varint,
            RawValue::Fixed64(_) => WireType::Fixed64,
            RawValue::LengthDelimited(_) => WireType::LengthDelimited,
            RawValue::Fixed32(_) => WireType::Fixed32,
        }
    }
}

pub fn read_fixed32(data: &mut SliceReader) -> Result<[u8; 4], DecodeError> {
    data.read_array::<4>()
}

pub fn read_fixed64(data: &mut SliceReader) -> Result<[u8; 8], DecodeError> {
    data.read_array::<8>()
}

/// Reads a varint length prefix followed by exactly that many bytes.
pub fn read_length_delimited<'a>(data: &mut SliceReader<'a>) -> Result<&'a [u8], DecodeError> {
    let length = read_unsigned_varint(data)?;
    // A length beyond usize can never be satisfied by the remaining data.
    let length = usize::try_from(length).unwrap_or(usize::MAX);
    data.read(length)
}

/// Reads the value of the given wire type.
pub fn read_value<'a>(
    data: &mut SliceReader<'a>,
    wire_type: WireType,
) -> Result<RawValue<'a>, DecodeError> {
    let value = match wire_type {
        WireType::Varint => RawValue::Varint(read_unsigned_varint(data)?),
        WireType::Fixed64 => RawValue::Fixed64(read_fixed64(data)?),
        WireType::LengthDelimited => RawValue::LengthDelimited(read_length_delimited(data)?),
        WireType::Fixed32 => RawValue::Fixed32(read_fixed32(data)?),
    };
    Ok(value)
}

/// Decodes a packed repeated varint payload (the bytes of a length-delimited field).
pub fn read_packed_varint(payload: &[u8]) -> Result<Vec<u64>, DecodeError> {
    read_packed(payload, read_unsigned_varint)
}

/// Decodes a packed repeated fixed32 payload.
/// The payload length must be a multiple of 4.
pub fn read_packed_fixed32(payload: &[u8]) -> Result<Vec<u32>, DecodeError> {
    read_packed(payload, |data| read_fixed32(data).map(u32::from_le_bytes))
}

/// Decodes a packed repeated fixed64 payload.
/// The payload length must be a multiple of 8.
pub fn read_packed_fixed64(payload: &[u8]) -> Result<Vec<u64>, DecodeError> {
    read_packed(payload, |data| read_fixed64(data).map(u64::from_le_bytes))
}

fn read_packed<'a, T>(
    payload: &'a [u8],
    mut read_one: impl FnMut(&mut SliceReader<'a>) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let mut reader = SliceReader::new(payload);
    let mut out = Vec::new();
    while !reader.is_empty() {
        out.push(read_one(&mut reader)?);
    }
    Ok(out)
}
