use crate::error::DecodeError;

/// A mutable reader of an immutable data source.
///
/// Positions reported by the reader are absolute, i.e. they include the `base`
/// offset of the slice inside the buffer it was cut from. This keeps byte ranges
/// of nested messages pointing into the root buffer.
#[derive(Debug, Clone)]
pub struct SliceReader<'x> {
    data: &'x [u8],
    pos: usize,
    base: usize,
}

impl<'x> SliceReader<'x> {
    pub fn new(data: &'x [u8]) -> Self {
        Self::with_base(data, 0)
    }

    /// Creates a reader over `data` which starts at `base` in some outer buffer.
    pub fn with_base(data: &'x [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Remaining data to read
    pub fn len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// The absolute offset of the next byte to read
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// A checkpoint that can later be handed to [`SliceReader::rewind`].
    pub fn checkpoint(&self) -> usize {
        self.pos
    }

    /// Moves the reader back to a position obtained from [`SliceReader::checkpoint`].
    pub fn rewind(&mut self, checkpoint: usize) {
        debug_assert!(checkpoint <= self.pos);
        self.pos = checkpoint;
    }

    /// Advances the position by `n`.
    /// Callers must make sure `n` does not exceed [`SliceReader::len`].
    fn advance_by(&mut self, n: usize) {
        self.pos += n;
        debug_assert!(self.pos <= self.data.len())
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::Truncated {
            offset: self.offset(),
            needed,
            remaining: self.len(),
        }
    }

    /// Reads `n` bytes and advances the reader by `n`.
    /// Nothing is consumed if fewer than `n` bytes remain.
    pub fn read(&mut self, n: usize) -> Result<&'x [u8], DecodeError> {
        if self.len() < n {
            return Err(self.truncated(n));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.advance_by(n);
        Ok(out)
    }

    /// Reads one byte and advances the reader by 1
    pub fn read_one(&mut self) -> Result<u8, DecodeError> {
        let Some(&out) = self.data.get(self.pos) else {
            return Err(self.truncated(1));
        };
        self.advance_by(1);
        Ok(out)
    }

    /// Reads `N` bytes and advances the reader by `N`.
    /// The result is copied into an array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_fixed_length_works() {
        let original = vec![5u8, 7, 234, 2, 45, 0, 12, 32, 192];

        // read 3
        let mut reader = SliceReader::new(&original);
        assert_eq!(reader.read_array::<3>().unwrap(), [5, 7, 234]);
        assert_eq!(reader.len(), 6);

        // read 0
        let mut reader = SliceReader::new(&original);
        assert_eq!(reader.read_array::<0>().unwrap(), []);
        assert_eq!(reader.len(), 9);

        // read 10 (exceeds length)
        let mut reader = SliceReader::new(&original);
        assert_eq!(
            reader.read_array::<10>().unwrap_err(),
            DecodeError::Truncated {
                offset: 0,
                needed: 10,
                remaining: 9
            }
        );
        assert_eq!(reader.len(), 9);

        // consecutive reads (2, 3, 4 bytes)
        let mut reader = SliceReader::new(&original);
        assert_eq!(reader.read_array::<2>().unwrap(), [5, 7]);
        assert_eq!(reader.read_array::<3>().unwrap(), [234, 2, 45]);
        assert_eq!(reader.read_array::<4>().unwrap(), [0, 12, 32, 192]);
        assert_eq!(reader.len(), 0);
        assert!(reader.is_empty());
        assert!(reader.read_one().is_err());
    }

    #[test]
    fn offsets_include_base() {
        let data = [1u8, 2, 3, 4];
        let mut reader = SliceReader::with_base(&data, 10);
        assert_eq!(reader.offset(), 10);
        reader.read(3).unwrap();
        assert_eq!(reader.offset(), 13);
        assert_eq!(
            reader.read(2).unwrap_err(),
            DecodeError::Truncated {
                offset: 13,
                needed: 2,
                remaining: 1
            }
        );
    }

    #[test]
    fn rewind_restores_position() {
        let data = [1u8, 2, 3, 4];
        let mut reader = SliceReader::new(&data);
        reader.read_one().unwrap();
        let checkpoint = reader.checkpoint();
        reader.read(2).unwrap();
        assert_eq!(reader.len(), 1);
        reader.rewind(checkpoint);
        assert_eq!(reader.len(), 3);
        assert_eq!(reader.read_one().unwrap(), 2);
    }
}
