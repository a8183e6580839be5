//! A schema-less protobuf decoder to look into anything.
//! It decodes protobuf bytes without a `.proto` file and lets you pull values out by
//! field number paths such as `1.2.4:string`, which makes it handy for reverse engineering,
//! debugging and ad-hoc extraction from captured traffic.
//!
//! Since the bytes carry no schema, rawproto cannot know what a length-delimited field holds.
//! Every such field is speculatively parsed as a nested message; the value type in the
//! query path decides how a field is finally read.
//!
//! The crate is split in three layers:
//!
//! - [`FieldStream`] iterates over the raw fields of a message in wire order
//! - [`Tree`] collects the fields and the nested messages they may contain
//! - [`Tree::query`] resolves a path against a tree and converts the matches into [`Value`]s
//!
//! ## Paths
//!
//! ```text
//! path      := segment ('.' segment)*
//! segment   := fieldNumber (':' valueType)?     -- valueType only on the last segment
//! valueType := raw | var | i32 | u32 | bool | f32 | i64 | u64 | double
//!            | string | bytes | packedvar | packed32 | packed64
//! ```
//!
//! Each value type is only legal for one wire type, see [`ValueType::legal_for`].
//! `raw` is legal for all of them and returns the [`Field`] itself. It is the default.
//!
//! ## Example
//!
//! ```
//! use rawproto::{Tree, Value};
//!
//! // 6: [3, 270, 86942] (packed)
//! let data = [0x32, 0x06, 0x03, 0x8e, 0x02, 0x9e, 0xa7, 0x05];
//! let tree = Tree::parse(&data).unwrap();
//! assert_eq!(
//!     tree.query("6:packedvar").unwrap(),
//!     [Value::PackedVar(vec![3, 270, 86942])]
//! );
//! // a varint cannot be read from a length-delimited field
//! assert!(tree.query("6:var").is_err());
//! ```
//!
//! ## Non goals
//! - Validation against a `.proto` schema
//! - Groups (deprecated, see <https://protobuf.dev/programming-guides/proto2/#groups>)
//! - Encoding
//! - Guessing field types beyond what a path asks for

mod error;
mod path;
mod query;
mod slice_reader;
mod stream;
mod tree;
mod value;
mod varint;
mod wire;

pub use error::{DecodeError, PathError, QueryError};
pub use path::Path;
pub use query::Query;
pub use stream::FieldStream;
pub use tree::{Field, ParseOptions, Tree};
pub use value::{Value, ValueType};
pub use wire::{read_packed_fixed32, read_packed_fixed64, read_packed_varint, RawValue, WireType};
