use thiserror::Error;

use crate::value::ValueType;
use crate::wire::WireType;

/// Errors produced while decoding wire data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A read requested more bytes than remain in the buffer
    #[error("truncated input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    /// Found a wire type that is either not valid protobuf or unsupported (groups)
    #[error("unsupported wire type {wire_type} at offset {offset}")]
    UnsupportedWireType { wire_type: u8, offset: usize },
    /// A varint longer than 10 bytes or not fitting into 64 bits
    #[error("varint at offset {offset} overflows 64 bits")]
    VarintOverflow { offset: usize },
    /// Field numbers must fit into 32 bits
    #[error("invalid field number {0}")]
    InvalidFieldNumber(u64),
}

/// Errors produced while parsing a path string like `1.2.4:string`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("empty segment at position {index}")]
    EmptySegment { index: usize },
    #[error("invalid field number: {0:?}")]
    InvalidFieldNumber(String),
    #[error("unknown value type: {0:?}")]
    UnknownValueType(String),
    /// Only the final segment may carry a `:type` suffix
    #[error("value type on segment {index}, only the last segment may have one")]
    TypeOnInnerSegment { index: usize },
}

/// Errors produced by path queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error(transparent)]
    Path(#[from] PathError),
    /// The requested value type cannot be read from the matched field's wire type
    #[error(
        "wire type {wire_type} does not support `{requested}`, expected one of: {}",
        join_labels(.legal)
    )]
    IncompatibleType {
        wire_type: WireType,
        requested: ValueType,
        legal: &'static [ValueType],
    },
    /// A packed payload did not decode cleanly
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

fn join_labels(labels: &[ValueType]) -> String {
    labels
        .iter()
        .map(|label| label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incompatible_type_message_lists_legal_labels() {
        let err = QueryError::IncompatibleType {
            wire_type: WireType::LengthDelimited,
            requested: ValueType::Var,
            legal: ValueType::legal_for(WireType::LengthDelimited),
        };
        assert_eq!(
            err.to_string(),
            "wire type LENGTH_DELIMITED (2) does not support `var`, expected one of: string, bytes, packedvar, packed32, packed64"
        );
    }

    #[test]
    fn truncated_message() {
        let err = DecodeError::Truncated {
            offset: 3,
            needed: 5,
            remaining: 4,
        };
        assert_eq!(
            err.to_string(),
            "truncated input at offset 3: needed 5 bytes, 4 remaining"
        );
    }
}
