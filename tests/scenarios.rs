// Examples from https://protobuf.dev/programming-guides/encoding/

use hex_literal::hex;
use rawproto::{
    DecodeError, FieldStream, ParseOptions, Query, QueryError, RawValue, Tree, Value, ValueType,
    WireType,
};

#[test]
fn a_simple_message() {
    // 1: 150
    let data = hex!("08 96 01");
    let tree = Tree::parse(&data).unwrap();
    assert_eq!(tree.len(), 1);
    let field = &tree.fields()[0];
    assert_eq!(field.number(), 1);
    assert_eq!(field.wire_type(), WireType::Varint);
    assert_eq!(field.value(), RawValue::Varint(150));
    assert_eq!(field.range().len(), 2);
    assert_eq!(tree.query("1:var").unwrap(), [Value::Var(150)]);
}

#[test]
fn length_delimited_records() {
    // 2: {"testing"}
    let data = hex!("12 07 74 65 73 74 69 6e 67");
    let tree = Tree::parse(&data).unwrap();
    let field = &tree.fields()[0];
    assert_eq!(field.number(), 2);
    assert_eq!(field.wire_type(), WireType::LengthDelimited);
    assert_eq!(field.range().len(), 8);
    assert_eq!(tree.query("2:string").unwrap()[0].as_str(), Some("testing"));
}

#[test]
fn submessages() {
    // 3: {1: 150}
    let data = hex!("1a 03 08 96 01");
    let tree = Tree::parse(&data).unwrap();
    let field = &tree.fields()[0];
    assert_eq!(field.number(), 3);
    assert_eq!(field.wire_type(), WireType::LengthDelimited);
    assert_eq!(field.range().len(), 4);

    let sub_tree = field.sub_tree().unwrap();
    assert_eq!(sub_tree.len(), 1);
    assert_eq!(sub_tree.fields()[0].number(), 1);
    assert_eq!(sub_tree.fields()[0].value(), RawValue::Varint(150));
    assert_eq!(tree.query("3.1:var").unwrap(), [Value::Var(150)]);
}

#[test]
fn repeated_elements() {
    // 4: {"hello"}, 5: 1, 5: 2, 5: 3
    let data = hex!("22 05 68 65 6c 6c 6f 28 01 28 02 28 03");
    let tree = Tree::parse(&data).unwrap();
    let seen: Vec<_> = tree
        .iter()
        .map(|field| (field.number(), field.wire_type()))
        .collect();
    assert_eq!(
        seen,
        [
            (4, WireType::LengthDelimited),
            (5, WireType::Varint),
            (5, WireType::Varint),
            (5, WireType::Varint),
        ]
    );
    assert_eq!(tree.query("4:string").unwrap()[0].as_str(), Some("hello"));
    assert_eq!(
        tree.query("5:var").unwrap(),
        [Value::Var(1), Value::Var(2), Value::Var(3)]
    );
}

#[test]
fn packed_repeated_fields() {
    // 6: {3 270 86942}
    let data = hex!("32 06 03 8e 02 9e a7 05");
    let tree = Tree::parse(&data).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.fields()[0].number(), 6);
    assert_eq!(
        tree.query("6:packedvar").unwrap(),
        [Value::PackedVar(vec![3, 270, 86942])]
    );
}

/// A store listing shaped like `1: {2: {4: {1: id, 5: title, 8: {1: 5, 2: 3}}}}`
fn listing() -> Vec<u8> {
    let mut details = Vec::new();
    details.extend_from_slice(&hex!("0a 0f"));
    details.extend_from_slice(b"com.example.app");
    details.extend_from_slice(&hex!("2a 07"));
    details.extend_from_slice(b"Example");
    details.extend_from_slice(&hex!("42 04 08 05 10 03"));

    for number in [4u8, 2, 1] {
        let mut wrapped = vec![number << 3 | 2, details.len() as u8];
        wrapped.extend_from_slice(&details);
        details = wrapped;
    }
    details
}

#[test]
fn nested_listing() {
    let data = listing();
    let tree = Tree::parse(&data).unwrap();

    assert_eq!(
        tree.query("1.2.4.1:string").unwrap()[0].as_str(),
        Some("com.example.app")
    );
    assert_eq!(
        tree.query("1.2.4.5:string").unwrap()[0].as_str(),
        Some("Example")
    );
    assert_eq!(tree.query("1.2.4.8.1:var").unwrap(), [Value::Var(5)]);

    // bytes of the sub-message itself
    let bytes = tree.query("1.2.4:bytes").unwrap();
    assert_eq!(bytes[0].as_bytes().unwrap().len(), 32);

    // raw sub-message including its metadata
    let raw = tree.query("1.2.4:raw").unwrap();
    let field = raw[0].as_field().unwrap();
    assert_eq!(field.number(), 4);
    assert_eq!(field.range().len(), 33);
    assert_eq!(&data[field.payload_range()], bytes[0].as_bytes().unwrap());
    let sub_tree = field.sub_tree().unwrap();
    assert_eq!(sub_tree.len(), 3);
    assert_eq!(sub_tree.query("5:string").unwrap()[0].as_str(), Some("Example"));

    // the same through a prefix
    let query = Query::new()
        .with_prefix("1.2.4")
        .unwrap()
        .with_type("1", ValueType::String)
        .unwrap();
    assert_eq!(
        query.get(&tree, "1").unwrap()[0].as_str(),
        Some("com.example.app")
    );
}

#[test]
fn wrong_value_type_names_wire_type_and_alternatives() {
    let data = listing();
    let tree = Tree::parse(&data).unwrap();
    let err = tree.query("1.2.4.1:var").unwrap_err();
    assert!(matches!(
        err,
        QueryError::IncompatibleType {
            wire_type: WireType::LengthDelimited,
            requested: ValueType::Var,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "wire type LENGTH_DELIMITED (2) does not support `var`, expected one of: string, bytes, packedvar, packed32, packed64"
    );
}

#[test]
fn framed_payload() {
    let mut data = vec![0x00];
    let body = listing();
    data.extend_from_slice(&(body.len() as u32).to_be_bytes());
    data.extend_from_slice(&body);

    // without the shim the prefix reads as two zero varints and then a reserved wire type
    assert!(matches!(
        Tree::parse(&data),
        Err(DecodeError::UnsupportedWireType { wire_type: 6, offset: 4 })
    ));

    let options = ParseOptions::new().with_strip_frame(true);
    let tree = Tree::parse_with(&data, &options).unwrap();
    assert_eq!(
        tree.query("1.2.4.5:string").unwrap()[0].as_str(),
        Some("Example")
    );
    assert_eq!(tree.fields()[0].range().start, 6);
}

#[test]
fn field_stream_accounts_for_every_byte() {
    let data = listing();
    let mut covered = 0;
    let mut cursor = 0;
    for field in FieldStream::new(&data) {
        let field = field.unwrap();
        let range = field.range();
        // the tag sits between the end of the previous field and the start of this one
        assert!(range.start > cursor);
        covered += range.start - cursor + range.len();
        cursor = range.end;
    }
    assert_eq!(covered, data.len());
}

#[test]
fn trailing_garbage_is_reported() {
    // 1: 150 followed by an incomplete tag
    let data = hex!("08 96 01 80");
    assert!(matches!(
        Tree::parse(&data),
        Err(DecodeError::Truncated { offset: 4, .. })
    ));
}
