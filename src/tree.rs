use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use crate::error::DecodeError;
use crate::slice_reader::SliceReader;
use crate::stream::FieldStream;
use crate::wire::{RawValue, WireType};

/// Customary protobuf recursion limit
const DEFAULT_MAX_DEPTH: usize = 100;

/// Options for [`Tree::parse_with`].
///
/// ## Example
///
/// ```
/// use rawproto::{ParseOptions, Tree};
///
/// // framing prefix: flag byte, then big endian length
/// let data = [0x00, 0x00, 0x00, 0x00, 0x03, 0x08, 0x96, 0x01];
/// let options = ParseOptions::new().with_strip_frame(true);
/// let tree = Tree::parse_with(&data, &options).unwrap();
/// assert_eq!(tree.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    strip_frame: bool,
    max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strip_frame: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips a leading frame prefix (one flag byte followed by a 4 byte big endian length)
    /// when the declared length matches the number of bytes after it.
    /// If it does not match, the data is parsed from the start as usual.
    pub fn with_strip_frame(mut self, strip_frame: bool) -> Self {
        self.strip_frame = strip_frame;
        self
    }

    /// Limits how deep length-delimited payloads are speculatively parsed as messages.
    ///
    /// Fields below the limit have no [`Field::sub_tree`] attached. Queries parse
    /// such payloads on demand, so this only affects how much work is done up front.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn strip_frame(&self) -> bool {
        self.strip_frame
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// A decoded field
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    number: u32,
    range: Range<usize>,
    value: RawValue<'a>,
    sub_tree: Option<Tree<'a>>,
    // speculation stopped at the depth limit somewhere below this field
    limited: bool,
}

impl<'a> Field<'a> {
    pub(crate) fn new(number: u32, range: Range<usize>, value: RawValue<'a>) -> Self {
        Self {
            number,
            range,
            value,
            sub_tree: None,
            limited: false,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn wire_type(&self) -> WireType {
        self.value.wire_type()
    }

    /// The bytes of the field after its tag in the root buffer.
    /// For length-delimited fields this includes the length prefix.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Like [`Field::range`] but without the length prefix of length-delimited fields.
    pub fn payload_range(&self) -> Range<usize> {
        match self.value {
            RawValue::LengthDelimited(payload) => self.range.end - payload.len()..self.range.end,
            _ => self.range(),
        }
    }

    pub fn value(&self) -> RawValue<'a> {
        self.value
    }

    /// The payload of a length-delimited field. None for all other wire types.
    pub fn payload(&self) -> Option<&'a [u8]> {
        match self.value {
            RawValue::LengthDelimited(payload) => Some(payload),
            _ => None,
        }
    }

    /// The payload parsed as a nested message, if that succeeded while building the tree.
    ///
    /// A present sub-tree does not prove the payload is a message: strings and bytes
    /// may happen to parse as well.
    pub fn sub_tree(&self) -> Option<&Tree<'a>> {
        self.sub_tree.as_ref()
    }

    /// The attached sub-tree, or the payload parsed on the spot if none is attached.
    pub(crate) fn children(&self) -> Option<Cow<'_, Tree<'a>>> {
        match &self.sub_tree {
            Some(sub_tree) => Some(Cow::Borrowed(sub_tree)),
            None => self.parse_on_demand().map(Cow::Owned),
        }
    }

    /// A copy of the field whose sub-tree is not cut short by the depth limit.
    pub(crate) fn to_complete(&self) -> Field<'a> {
        let mut field = self.clone();
        if self.limited {
            let sub_tree = self.parse_on_demand();
            field.limited = sub_tree.as_ref().is_some_and(Tree::is_limited);
            field.sub_tree = sub_tree;
        }
        field
    }

    fn parse_on_demand(&self) -> Option<Tree<'a>> {
        let payload = self.payload()?;
        tracing::trace!(
            field = self.number,
            offset = self.range.start,
            "parsing payload on demand"
        );
        Tree::parse_nested(payload, self.payload_range().start, DEFAULT_MAX_DEPTH).ok()
    }
}

/// The decoded fields of a message in wire order.
///
/// Every length-delimited field is speculatively parsed as a nested message.
/// When that succeeds the result is attached as [`Field::sub_tree`]; when it fails the field
/// is kept as is.
///
/// ## Example
///
/// ```
/// use rawproto::{Tree, WireType};
///
/// // 3: {1: 150}
/// let tree = Tree::parse(&[0x1a, 0x03, 0x08, 0x96, 0x01]).unwrap();
/// let field = &tree.fields()[0];
/// assert_eq!(field.number(), 3);
/// assert_eq!(field.wire_type(), WireType::LengthDelimited);
/// assert_eq!(field.sub_tree().unwrap().fields()[0].number(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tree<'a> {
    fields: Vec<Field<'a>>,
}

impl<'a> Tree<'a> {
    /// Parses a message using the default [`ParseOptions`].
    pub fn parse(data: &'a [u8]) -> Result<Self, DecodeError> {
        Self::parse_with(data, &ParseOptions::default())
    }

    pub fn parse_with(data: &'a [u8], options: &ParseOptions) -> Result<Self, DecodeError> {
        let mut reader = SliceReader::new(data);
        if options.strip_frame {
            skip_frame(&mut reader);
        }
        build(reader, options.max_depth)
    }

    /// Parses `data` located at `base` in the root buffer.
    pub(crate) fn parse_nested(
        data: &'a [u8],
        base: usize,
        depth: usize,
    ) -> Result<Self, DecodeError> {
        build(SliceReader::with_base(data, base), depth)
    }

    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field<'a>> {
        self.fields.iter()
    }

    /// All fields with the given number in wire order.
    pub fn fields_numbered(&self, number: u32) -> impl Iterator<Item = &Field<'a>> {
        self.fields.iter().filter(move |field| field.number == number)
    }

    fn is_limited(&self) -> bool {
        self.fields.iter().any(|field| field.limited)
    }
}

impl<'t, 'a> IntoIterator for &'t Tree<'a> {
    type Item = &'t Field<'a>;
    type IntoIter = std::slice::Iter<'t, Field<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

fn build<'a>(reader: SliceReader<'a>, depth: usize) -> Result<Tree<'a>, DecodeError> {
    let mut fields = Vec::new();
    for field in FieldStream::from_reader(reader) {
        let mut field = field?;
        if let Some(payload) = field.payload() {
            field.sub_tree = speculate(&field, payload, depth);
            field.limited = match &field.sub_tree {
                Some(sub_tree) => sub_tree.is_limited(),
                None => depth == 0,
            };
        }
        fields.push(field);
    }
    Ok(Tree { fields })
}

fn speculate<'a>(field: &Field<'a>, payload: &'a [u8], depth: usize) -> Option<Tree<'a>> {
    if depth == 0 {
        tracing::trace!(
            field = field.number,
            offset = field.range.start,
            "depth limit reached, not parsing payload"
        );
        return None;
    }
    match Tree::parse_nested(payload, field.payload_range().start, depth - 1) {
        Ok(tree) => Some(tree),
        Err(err) => {
            tracing::trace!(
                field = field.number,
                offset = field.range.start,
                error = %err,
                "payload is not a message"
            );
            None
        }
    }
}

fn skip_frame(reader: &mut SliceReader) {
    let checkpoint = reader.checkpoint();
    let declared = reader
        .read_one()
        .and_then(|_| reader.read_array::<4>())
        .map(u32::from_be_bytes);
    match declared {
        Ok(length) if length as usize == reader.len() => {
            tracing::debug!(length, "skipped frame prefix");
        }
        _ => {
            tracing::debug!("no frame prefix found, parsing from the start");
            reader.rewind(checkpoint);
        }
    }
}

/// Renders the tree similar to `protoc --decode_raw`.
impl fmt::Display for Tree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tree(self, f, 0)
    }
}

fn write_tree(tree: &Tree, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    for field in tree {
        write!(f, "{:indent$}{}", "", field.number, indent = indent)?;
        match (field.value, &field.sub_tree) {
            (RawValue::Varint(v), _) => writeln!(f, ": {v}")?,
            (RawValue::Fixed64(b), _) => writeln!(f, ": {:#018x}", u64::from_le_bytes(b))?,
            (RawValue::Fixed32(b), _) => writeln!(f, ": {:#010x}", u32::from_le_bytes(b))?,
            (RawValue::LengthDelimited(_), Some(sub_tree)) if !sub_tree.is_empty() => {
                writeln!(f, " {{")?;
                write_tree(sub_tree, f, indent + 2)?;
                writeln!(f, "{:indent$}}}", "", indent = indent)?;
            }
            (RawValue::LengthDelimited(payload), _) => {
                writeln!(f, ": \"{}\"", payload.escape_ascii())?
            }
        }
    }
    Ok(())
}
