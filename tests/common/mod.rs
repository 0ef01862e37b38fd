#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use xdr_layout::{Describe, Field, Layout, Tag};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayElementStruct {
    pub boolean_in_array_element: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildStruct {
    pub boolean_in_child: bool,
}

/// One field of every XDR category, with and without declared bounds.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentStruct {
    pub integer: i32,
    pub unsigned_integer: u32,
    pub enumeration_as_i32: i32,
    pub enumeration_as_u32: u32,
    pub boolean: bool,
    pub hyper_integer: i64,
    pub unsigned_hyper_integer: u64,
    pub fixed_length_opaque_data: [u8; 5],
    pub variable_length_opaque_data_no_max: Vec<u8>,
    pub variable_length_opaque_data_with_max: Vec<u8>,
    pub string_as_bytes_no_max: Vec<u8>,
    pub string_as_bytes_with_max: Vec<u8>,
    pub string_as_string_no_max: String,
    pub string_as_string_with_max: String,
    pub fixed_length_array: [ArrayElementStruct; 3],
    pub variable_length_array_no_max: Vec<ArrayElementStruct>,
    pub variable_length_array_with_max: Vec<ArrayElementStruct>,
    pub structure: ChildStruct,
}

pub const ARRAY_ELEMENT: Layout = Layout::new(
    "ArrayElementStruct",
    &[Field::new("boolean_in_array_element", Tag::Boolean)],
);

pub const CHILD: Layout = Layout::new("ChildStruct", &[Field::new("boolean_in_child", Tag::Boolean)]);

impl Describe for ArrayElementStruct {
    const LAYOUT: Option<&'static Layout> = Some(&ARRAY_ELEMENT);
}

impl Describe for ChildStruct {
    const LAYOUT: Option<&'static Layout> = Some(&CHILD);
}

pub const PARENT: Layout = Layout::new(
    "ParentStruct",
    &[
        Field::of::<i32>("integer", Tag::Integer),
        Field::of::<u32>("unsigned_integer", Tag::UnsignedInteger),
        Field::of::<i32>("enumeration_as_i32", Tag::Enumeration),
        Field::of::<u32>("enumeration_as_u32", Tag::Enumeration),
        Field::of::<bool>("boolean", Tag::Boolean),
        Field::of::<i64>("hyper_integer", Tag::HyperInteger),
        Field::of::<u64>("unsigned_hyper_integer", Tag::UnsignedHyperInteger),
        Field::of::<[u8; 5]>("fixed_length_opaque_data", Tag::FixedLengthOpaqueData),
        Field::of::<Vec<u8>>("variable_length_opaque_data_no_max", Tag::VariableLengthOpaqueData),
        Field::of::<Vec<u8>>("variable_length_opaque_data_with_max", Tag::VariableLengthOpaqueData)
            .max_size(6),
        Field::of::<Vec<u8>>("string_as_bytes_no_max", Tag::String),
        Field::of::<Vec<u8>>("string_as_bytes_with_max", Tag::String).max_size(3),
        Field::of::<String>("string_as_string_no_max", Tag::String),
        Field::of::<String>("string_as_string_with_max", Tag::String).max_size(7),
        Field::of::<[ArrayElementStruct; 3]>("fixed_length_array", Tag::FixedLengthArray),
        Field::of::<Vec<ArrayElementStruct>>("variable_length_array_no_max", Tag::VariableLengthArray),
        Field::of::<Vec<ArrayElementStruct>>("variable_length_array_with_max", Tag::VariableLengthArray)
            .max_size(2),
        Field::of::<ChildStruct>("structure", Tag::Structure),
    ],
);

impl Describe for ParentStruct {
    const LAYOUT: Option<&'static Layout> = Some(&PARENT);
}

fn element(b: bool) -> ArrayElementStruct {
    ArrayElementStruct {
        boolean_in_array_element: b,
    }
}

pub fn good_parent() -> ParentStruct {
    ParentStruct {
        integer: -1_000_000,
        unsigned_integer: 1_000_000,
        enumeration_as_i32: -1000,
        enumeration_as_u32: 1000,
        boolean: true,
        hyper_integer: -1_000_000_000_000,
        unsigned_hyper_integer: 1_000_000_000_000,
        fixed_length_opaque_data: [0x01, 0x02, 0x03, 0x04, 0x05],
        variable_length_opaque_data_no_max: vec![0x01, 0x02, 0x03],
        variable_length_opaque_data_with_max: vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06],
        string_as_bytes_no_max: b"Hi".to_vec(),
        string_as_bytes_with_max: b"Bye".to_vec(),
        string_as_string_no_max: "Hi".into(),
        string_as_string_with_max: "Bye".into(),
        fixed_length_array: [element(true), element(false), element(true)],
        variable_length_array_no_max: vec![element(true)],
        variable_length_array_with_max: vec![element(true), element(false)],
        structure: ChildStruct {
            boolean_in_child: true,
        },
    }
}

/// Same as [`good_parent`] but with 8 bytes where at most 6 are declared.
pub fn bad_parent() -> ParentStruct {
    ParentStruct {
        variable_length_opaque_data_with_max: vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08],
        ..good_parent()
    }
}

#[rustfmt::skip]
pub const GOOD_PARENT_PACKED: [u8; 132] = [
    0xFF, 0xF0, 0xBD, 0xC0,                                                 // -1000000
    0x00, 0x0F, 0x42, 0x40,                                                 // 1000000
    0xFF, 0xFF, 0xFC, 0x18,                                                 // -1000
    0x00, 0x00, 0x03, 0xE8,                                                 // 1000
    0x00, 0x00, 0x00, 0x01,                                                 // true
    0xFF, 0xFF, 0xFF, 0x17, 0x2B, 0x5A, 0xF0, 0x00,                         // -1000000000000
    0x00, 0x00, 0x00, 0xE8, 0xD4, 0xA5, 0x10, 0x00,                         // 1000000000000
    0x01, 0x02, 0x03, 0x04, 0x05, 0x00, 0x00, 0x00,                         // [1, 2, 3, 4, 5]
    0x00, 0x00, 0x00, 0x03, 0x01, 0x02, 0x03, 0x00,                         // [1, 2, 3]
    0x00, 0x00, 0x00, 0x06, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x00, 0x00, // [1, 2, 3, 4, 5, 6]
    0x00, 0x00, 0x00, 0x02, 0x48, 0x69, 0x00, 0x00,                         // b"Hi"
    0x00, 0x00, 0x00, 0x03, 0x42, 0x79, 0x65, 0x00,                         // b"Bye"
    0x00, 0x00, 0x00, 0x02, 0x48, 0x69, 0x00, 0x00,                         // "Hi"
    0x00, 0x00, 0x00, 0x03, 0x42, 0x79, 0x65, 0x00,                         // "Bye"
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, // [true, false, true]
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,                         // [true]
    0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, // [true, false]
    0x00, 0x00, 0x00, 0x01,                                                 // { true }
];

/// The bad value, packed without regard to its declared bound.
#[rustfmt::skip]
pub const BAD_PARENT_PACKED: [u8; 132] = [
    0xFF, 0xF0, 0xBD, 0xC0,
    0x00, 0x0F, 0x42, 0x40,
    0xFF, 0xFF, 0xFC, 0x18,
    0x00, 0x00, 0x03, 0xE8,
    0x00, 0x00, 0x00, 0x01,
    0xFF, 0xFF, 0xFF, 0x17, 0x2B, 0x5A, 0xF0, 0x00,
    0x00, 0x00, 0x00, 0xE8, 0xD4, 0xA5, 0x10, 0x00,
    0x01, 0x02, 0x03, 0x04, 0x05, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x03, 0x01, 0x02, 0x03, 0x00,
    0x00, 0x00, 0x00, 0x08, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, // exceeds the bound of 6
    0x00, 0x00, 0x00, 0x02, 0x48, 0x69, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x03, 0x42, 0x79, 0x65, 0x00,
    0x00, 0x00, 0x00, 0x02, 0x48, 0x69, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x03, 0x42, 0x79, 0x65, 0x00,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x01,
];

/// Offsets of every padding byte in [`GOOD_PARENT_PACKED`].
pub const GOOD_PARENT_PADDING: [usize; 12] = [41, 42, 43, 51, 62, 63, 70, 71, 79, 86, 87, 95];
