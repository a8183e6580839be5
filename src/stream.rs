use crate::error::DecodeError;
use crate::slice_reader::SliceReader;
use crate::tree::Field;
use crate::varint::read_unsigned_varint;
use crate::wire::{read_value, WireType};

/// Iterates over the fields of an encoded message in wire order.
///
/// Fields produced by the stream never carry a sub-tree, see [`crate::Tree`] for that.
/// After the first error the stream is exhausted. Decoding can be restarted by
/// creating a new stream over the same data.
///
/// ## Example
///
/// ```
/// use rawproto::{FieldStream, RawValue};
///
/// let data = [0x08, 0x96, 0x01, 0x12, 0x02, 0x68, 0x69];
/// let fields = FieldStream::new(&data)
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(fields.len(), 2);
/// assert_eq!(fields[0].value(), RawValue::Varint(150));
/// assert_eq!(fields[1].payload(), Some(&b"hi"[..]));
/// ```
#[derive(Debug, Clone)]
pub struct FieldStream<'a> {
    reader: SliceReader<'a>,
    failed: bool,
}

impl<'a> FieldStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::from_reader(SliceReader::new(data))
    }

    pub(crate) fn from_reader(reader: SliceReader<'a>) -> Self {
        Self {
            reader,
            failed: false,
        }
    }
}

impl<'a> Iterator for FieldStream<'a> {
    type Item = Result<Field<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_empty() {
            return None;
        }
        let field = read_field(&mut self.reader);
        self.failed = field.is_err();
        Some(field)
    }
}

fn read_field<'a>(reader: &mut SliceReader<'a>) -> Result<Field<'a>, DecodeError> {
    let tag_offset = reader.offset();
    let tag = read_unsigned_varint(reader)?;

    let number: u32 = (tag >> 3)
        .try_into()
        .map_err(|_| DecodeError::InvalidFieldNumber(tag >> 3))?;
    let wire_bits = (tag & 0x07) as u8;
    let wire_type =
        WireType::from_bits(wire_bits).ok_or(DecodeError::UnsupportedWireType {
            wire_type: wire_bits,
            offset: tag_offset,
        })?;

    let start = reader.offset();
    let value = read_value(reader, wire_type)?;
    Ok(Field::new(number, start..reader.offset(), value))
}
