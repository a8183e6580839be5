use crate::error::DecodeError;
use crate::slice_reader::SliceReader;

/// Longest possible encoding of a 64 bit varint
const MAX_VARINT_LEN: usize = 10;

/// Reads an unsigned varint (7 bit little-endian groups, high bit = continuation).
///
/// Fails with [`DecodeError::Truncated`] when the data ends before the last group
/// and with [`DecodeError::VarintOverflow`] when the value does not fit into a u64.
pub fn read_unsigned_varint(data: &mut SliceReader) -> Result<u64, DecodeError> {
    let start = data.offset();
    let mut out = 0u64;
    for byte_counter in 0..MAX_VARINT_LEN {
        let byte = data.read_one()?;
        let value = (byte & 0x7f) as u64;
        // The 10th group may only contribute the single remaining bit.
        if byte_counter == MAX_VARINT_LEN - 1 && value > 1 {
            return Err(DecodeError::VarintOverflow { offset: start });
        }
        out |= value << (byte_counter * 7);

        if byte & 0x80 == 0 {
            return Ok(out);
        }
    }

    Err(DecodeError::VarintOverflow { offset: start })
}

#[cfg(test)]
pub(crate) fn unsigned_varint_encode(mut n: u64, dest: &mut Vec<u8>) {
    loop {
        let mut b = (n & 0b0111_1111) as u8;
        n >>= 7;
        if n != 0 {
            b |= 0b1000_0000;
        }
        dest.push(b);
        if n == 0 {
            break;
        }
    }
}
