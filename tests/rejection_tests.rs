mod common;

use common::{BAD_PARENT_PACKED, GOOD_PARENT_PACKED, GOOD_PARENT_PADDING, ParentStruct, bad_parent, good_parent};
use serde::{Deserialize, Serialize};
use xdr_layout::{
    Describe, Error, Field, Kind, Layout, Tag, examine, examine_with, from_bytes, pack, pack_with,
    to_writer, unpack, unpack_with,
};

fn overflow() -> Error {
    Error::LengthOverflow {
        field: "variable_length_opaque_data_with_max",
        max: 6,
        got: 8,
    }
}

#[test]
fn test_examine_bad_parent() {
    let bad = bad_parent();
    assert_eq!(examine(&bad), Err(overflow()));
    assert_eq!(examine(&&bad), Err(overflow()));
}

#[test]
fn test_pack_bad_parent() {
    let bad = bad_parent();
    assert_eq!(pack(&bad), Err(overflow()));
    assert_eq!(pack(&&bad), Err(overflow()));
}

#[test]
fn test_to_writer_writes_nothing_on_error() {
    let mut out = Vec::new();
    assert_eq!(to_writer(&mut out, &bad_parent()), Err(overflow()));
    assert!(out.is_empty());
}

#[test]
fn test_unpack_bad_parent() {
    let mut decoded = ParentStruct::default();
    assert_eq!(unpack(&BAD_PARENT_PACKED, &mut decoded), Err(overflow()));
    // Destination untouched
    assert_eq!(decoded, ParentStruct::default());
}

#[test]
fn test_unpack_every_truncation() {
    for len in 0..GOOD_PARENT_PACKED.len() {
        let mut decoded = ParentStruct::default();
        let err = unpack(&GOOD_PARENT_PACKED[..len], &mut decoded).unwrap_err();
        assert!(
            matches!(err, Error::BufferTooSmall { .. }),
            "prefix of {len} bytes: {err}"
        );
    }
}

#[test]
fn test_unpack_truncated_word_reports_position() {
    assert_eq!(
        from_bytes::<u32>(&[0, 0, 0]),
        Err(Error::BufferTooSmall {
            kind: Kind::UnsignedInt32,
            offset: 0,
            needed: 4,
            remaining: 3,
        })
    );
}

#[test]
fn test_unpack_nonzero_padding() {
    for offset in GOOD_PARENT_PADDING {
        let mut buf = GOOD_PARENT_PACKED;
        buf[offset] = 0x01;
        let mut decoded = ParentStruct::default();
        assert_eq!(
            unpack(&buf, &mut decoded),
            Err(Error::InvalidPadding { offset }),
            "padding byte at {offset}"
        );
        buf[offset] = 0x00;
        assert_eq!(unpack(&buf, &mut decoded), Ok(132));
        assert_eq!(decoded, good_parent());
    }
}

#[test]
fn test_unpack_invalid_bool() {
    assert_eq!(
        from_bytes::<bool>(&[0, 0, 0, 2]),
        Err(Error::InvalidBool { offset: 0, value: 2 })
    );
    let mut buf = GOOD_PARENT_PACKED;
    buf[19] = 0x02;
    let mut decoded = ParentStruct::default();
    assert_eq!(
        unpack(&buf, &mut decoded),
        Err(Error::InvalidBool { offset: 16, value: 2 })
    );
    buf[16] = 0x80;
    buf[19] = 0x01;
    assert!(matches!(
        unpack(&buf, &mut decoded),
        Err(Error::InvalidBool { offset: 16, value: 0x8000_0001 })
    ));
}

#[test]
fn test_unpack_invalid_utf8() {
    assert_eq!(
        from_bytes::<String>(&[0, 0, 0, 2, 0xFF, 0xFE, 0, 0]),
        Err(Error::InvalidString { offset: 4 })
    );
}

#[test]
fn test_unpack_rejects_length_before_payload() {
    // String declared with at most 7 bytes; the prefix alone is enough to fail
    let mut buf = GOOD_PARENT_PACKED[..88].to_vec();
    buf.extend([0xFF, 0xFF, 0xFF, 0xFF]);
    let mut decoded = ParentStruct::default();
    assert_eq!(
        unpack(&buf, &mut decoded),
        Err(Error::LengthOverflow {
            field: "string_as_string_with_max",
            max: 7,
            got: 0xFFFF_FFFF,
        })
    );
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Wrong {
    value: i64,
}

const WRONG: Layout = Layout::new("Wrong", &[Field::new("value", Tag::Integer)]);

impl Describe for Wrong {
    const LAYOUT: Option<&'static Layout> = Some(&WRONG);
}

#[test]
fn test_tag_mismatch() {
    let expected: Result<(), Error> = Err(Error::TagMismatch {
        field: "value",
        kind: Kind::SignedInt64,
        tag: Tag::Integer,
    });
    assert_eq!(examine(&Wrong { value: 1 }), expected.clone().map(|()| 0));
    assert_eq!(pack(&Wrong { value: 1 }), expected.clone().map(|()| Vec::new()));
    let mut decoded = Wrong::default();
    assert_eq!(unpack(&[0; 8], &mut decoded), expected.map(|()| 0));
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Words {
    words: Vec<u32>,
}

const WORDS_AS_OPAQUE: Layout = Layout::new("Words", &[Field::new("words", Tag::VariableLengthOpaqueData)]);

#[test]
fn test_sequence_tag_mismatch() {
    let expected = Error::TagMismatch {
        field: "words",
        kind: Kind::VariableAggregateSequence,
        tag: Tag::VariableLengthOpaqueData,
    };
    let words = Words { words: vec![1, 2] };
    assert_eq!(examine_with(&words, Some(&WORDS_AS_OPAQUE)), Err(expected.clone()));
    let bytes = [0u8, 0, 0, 1, 0, 0, 0, 9];
    assert_eq!(
        unpack_with::<Words>(&bytes, Some(&WORDS_AS_OPAQUE)).map(|(w, _)| w),
        Err(expected)
    );
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Holder {
    items: Vec<i32>,
}

const HOLDER: Layout = Layout::new("Holder", &[Field::of::<Vec<i32>>("items", Tag::String)]);

impl Describe for Holder {
    const LAYOUT: Option<&'static Layout> = Some(&HOLDER);
}

#[test]
fn test_empty_sequence_tag_mismatch() {
    let expected = Error::TagMismatch {
        field: "items",
        kind: Kind::VariableAggregateSequence,
        tag: Tag::String,
    };
    let empty = Holder::default();
    assert_eq!(examine(&empty), Err(expected.clone()));
    assert_eq!(pack(&empty), Err(expected.clone()));
    let mut decoded = Holder { items: vec![3] };
    assert_eq!(unpack(&[0, 0, 0, 0], &mut decoded), Err(expected.clone()));
    assert_eq!(decoded.items, [3]);
    assert_eq!(examine(&Holder { items: vec![1] }), Err(expected));
}

#[test]
fn test_declared_shapes_accept_matching_tags() {
    for tag in [Tag::VariableLengthOpaqueData, Tag::String] {
        let field = Field::of::<Vec<u8>>("data", tag);
        assert_eq!(field.kind, Some(Kind::VariableByteSequence));
    }
    assert_eq!(Field::of::<[u8; 40]>("body", Tag::FixedLengthOpaqueData).kind, Some(Kind::FixedByteArray));
    assert_eq!(Field::of::<Box<u64>>("id", Tag::UnsignedHyperInteger).kind, Some(Kind::UnsignedInt64));
    assert_eq!(Field::of::<ParentStruct>("p", Tag::Structure).kind, Some(Kind::Aggregate));
    assert_eq!(Field::of::<ParentStruct>("p", Tag::Structure).layout, Some(&common::PARENT));
}

#[test]
fn test_bytes_declared_as_array() {
    const BYTES_AS_ARRAY: Layout = Layout::new("Blob", &[Field::new("data", Tag::FixedLengthArray)]);
    #[derive(Serialize)]
    struct Blob {
        data: [u8; 4],
    }
    assert_eq!(
        examine_with(&Blob { data: [1; 4] }, Some(&BYTES_AS_ARRAY)),
        Err(Error::TagMismatch {
            field: "data",
            kind: Kind::FixedByteArray,
            tag: Tag::FixedLengthArray,
        })
    );
}

#[test]
fn test_invalid_bound() {
    const TOO_BIG: Layout = Layout::new(
        "TooBig",
        &[Field::new("data", Tag::VariableLengthOpaqueData).max_size(0x1_0000_0000)],
    );
    let expected = Error::InvalidBound {
        field: "data",
        declared: 0x1_0000_0000,
    };
    let words = Words::default();
    assert_eq!(examine_with(&words, Some(&TOO_BIG)), Err(expected.clone()));
    assert_eq!(pack_with(&words, Some(&TOO_BIG)), Err(expected.clone()));
    assert_eq!(
        unpack_with::<Words>(&[0, 0, 0, 0], Some(&TOO_BIG)).map(|(w, _)| w),
        Err(expected)
    );
    // The ceiling itself is fine
    const AT_CEILING: Layout = Layout::new(
        "AtCeiling",
        &[Field::new("words", Tag::VariableLengthArray).max_size(0xFFFF_FFFF)],
    );
    assert_eq!(examine_with(&words, Some(&AT_CEILING)), Ok(4));
}

#[test]
fn test_zero_bound_allows_only_empty() {
    const NONE_ALLOWED: Layout = Layout::new(
        "Words",
        &[Field::new("words", Tag::VariableLengthArray).max_size(0)],
    );
    assert_eq!(examine_with(&Words::default(), Some(&NONE_ALLOWED)), Ok(4));
    assert_eq!(
        examine_with(&Words { words: vec![1] }, Some(&NONE_ALLOWED)),
        Err(Error::LengthOverflow {
            field: "words",
            max: 0,
            got: 1,
        })
    );
}

#[test]
fn test_missing_layout() {
    const DANGLING: Layout = Layout::new("Dangling", &[Field::new("child", Tag::Structure)]);
    assert_eq!(
        examine_with(&Words::default(), Some(&DANGLING)),
        Err(Error::MissingLayout {
            field: "child",
            name: "Dangling",
        })
    );

    #[derive(Serialize)]
    struct Undescribed {
        a: u32,
    }
    assert_eq!(
        examine_with(&Undescribed { a: 1 }, None),
        Err(Error::MissingLayout {
            field: "<root>",
            name: "Undescribed",
        })
    );
}

#[test]
fn test_field_name_mismatch() {
    const RENAMED: Layout = Layout::new("Words", &[Field::new("items", Tag::VariableLengthArray)]);
    let expected = Error::FieldName {
        layout: "Words",
        expected: "items",
        got: "words",
    };
    assert_eq!(examine_with(&Words::default(), Some(&RENAMED)), Err(expected.clone()));
    assert_eq!(
        unpack_with::<Words>(&[0, 0, 0, 0], Some(&RENAMED)).map(|(w, _)| w),
        Err(expected)
    );
}

#[test]
fn test_field_count_mismatch() {
    #[derive(Serialize)]
    struct Pair(u32, u32);
    const SINGLE: Layout = Layout::new("Pair", &[Field::new("first", Tag::UnsignedInteger)]);
    assert_eq!(
        examine_with(&Pair(1, 2), Some(&SINGLE)),
        Err(Error::FieldCount {
            layout: "Pair",
            expected: 1,
            got: 2,
        })
    );
}

#[test]
fn test_unsupported_shapes() {
    assert!(matches!(
        examine_with(&1.5f32, None),
        Err(Error::Unsupported { what: "f32", .. })
    ));
    assert!(matches!(
        examine_with(&Some(1u32), None),
        Err(Error::Unsupported { what: "optional data", .. })
    ));
    assert!(matches!(
        examine(&7u8),
        Err(Error::Unsupported {
            field: "<root>",
            ..
        })
    ));
    assert!(matches!(
        from_bytes::<u8>(&[0, 0, 0, 7]),
        Err(Error::Unsupported { .. })
    ));
    assert!(matches!(
        examine(&[0u32; 0]),
        Err(Error::Unsupported { .. })
    ));
    assert!(matches!(
        from_bytes::<[u32; 0]>(&[]),
        Err(Error::Unsupported { .. })
    ));
    assert!(matches!(
        examine_with(&std::collections::BTreeMap::<u32, u32>::new(), None),
        Err(Error::Unsupported { what: "map", .. })
    ));
}

#[test]
fn test_unsupported_enum() {
    #[derive(Serialize)]
    enum FileType {
        Regular,
    }
    assert!(matches!(
        pack_with(&FileType::Regular, None),
        Err(Error::Unsupported { .. })
    ));
}

#[test]
fn test_error_display() {
    let err = Error::TagMismatch {
        field: "value",
        kind: Kind::SignedInt64,
        tag: Tag::Integer,
    };
    assert_eq!(
        err.to_string(),
        "field `value`: signed 64-bit integer cannot be declared as \"Integer\""
    );
    assert_eq!(
        Error::InvalidPadding { offset: 0x29 }.to_string(),
        "non-zero padding byte at offset 0x29"
    );
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Node {
    children: Vec<Node>,
}

static NODE: Layout = Layout::new(
    "Node",
    &[Field::new("children", Tag::VariableLengthArray).layout(&NODE)],
);

fn chain(levels: usize) -> Node {
    (0..levels).fold(Node::default(), |child, _| Node {
        children: vec![child],
    })
}

#[test]
fn test_unpack_nested_tree() {
    let tree = chain(20);
    let bytes = pack_with(&tree, Some(&NODE)).unwrap();
    assert_eq!(bytes.len(), 21 * 4);
    let (decoded, consumed) = unpack_with::<Node>(&bytes, Some(&NODE)).unwrap();
    assert_eq!(consumed, 84);
    assert_eq!(decoded, tree);
}

#[test]
fn test_unpack_nesting_too_deep() {
    // Every four bytes open one more node holding one child
    let bytes = [0u8, 0, 0, 1].repeat(1_000_000);
    let err = unpack_with::<Node>(&bytes, Some(&NODE)).map(|(n, _)| n).unwrap_err();
    assert!(
        matches!(err, Error::DepthLimitExceeded { max: xdr_layout::MAX_DEPTH, .. }),
        "{err}"
    );
}
