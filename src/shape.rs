//! Shape classification and tag validation.
//!
//! A [`Kind`] is what a value turns out to be while it is walked; a [`Tag`]
//! is what the owning structure declared it to be. [`check_tag`] holds the
//! table of which declarations each runtime shape accepts:
//!
//! | Kind | accepted tags |
//! |------|---------------|
//! | `Boolean` | `Boolean` |
//! | `SignedInt32` | `Integer`, `Enumeration` |
//! | `UnsignedInt32` | `Unsigned Integer`, `Enumeration` |
//! | `SignedInt64` | `Hyper Integer` |
//! | `UnsignedInt64` | `Unsigned Hyper Integer` |
//! | `FixedByteArray` | `Fixed-Length Opaque Data` |
//! | `FixedAggregateArray` | `Fixed-Length Array` |
//! | `VariableByteSequence` | `Variable-Length Opaque Data`, `String` |
//! | `TextString` | `String` |
//! | `VariableAggregateSequence` | `Variable-Length Array` |
//! | `Aggregate` | `Structure` |
//! | `Indirection` | any (its target is checked in turn) |

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Largest length XDR can express in a 4-byte length prefix.
pub const MAX_LENGTH: u64 = 0xFFFF_FFFF;

/// Runtime shape of a value, which selects its XDR layout rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Boolean,
    SignedInt32,
    SignedInt64,
    UnsignedInt32,
    UnsignedInt64,
    FixedByteArray,
    FixedAggregateArray,
    VariableByteSequence,
    VariableAggregateSequence,
    TextString,
    Aggregate,
    /// Box, reference or newtype wrapper; encodes as the wrapped value.
    Indirection,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Boolean => "boolean",
            Kind::SignedInt32 => "signed 32-bit integer",
            Kind::SignedInt64 => "signed 64-bit integer",
            Kind::UnsignedInt32 => "unsigned 32-bit integer",
            Kind::UnsignedInt64 => "unsigned 64-bit integer",
            Kind::FixedByteArray => "fixed byte array",
            Kind::FixedAggregateArray => "fixed array",
            Kind::VariableByteSequence => "variable byte sequence",
            Kind::VariableAggregateSequence => "variable sequence",
            Kind::TextString => "text string",
            Kind::Aggregate => "structure",
            Kind::Indirection => "indirection",
        };
        f.write_str(name)
    }
}

/// Semantic category a structure field is declared as (RFC 4506 §4 names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Boolean,
    Integer,
    UnsignedInteger,
    Enumeration,
    HyperInteger,
    UnsignedHyperInteger,
    FixedLengthOpaqueData,
    FixedLengthArray,
    VariableLengthOpaqueData,
    String,
    VariableLengthArray,
    Structure,
}

impl Tag {
    /// Every tag, in RFC 4506 order.
    pub const ALL: [Tag; 12] = [
        Tag::Integer,
        Tag::UnsignedInteger,
        Tag::Enumeration,
        Tag::Boolean,
        Tag::HyperInteger,
        Tag::UnsignedHyperInteger,
        Tag::FixedLengthOpaqueData,
        Tag::VariableLengthOpaqueData,
        Tag::String,
        Tag::FixedLengthArray,
        Tag::VariableLengthArray,
        Tag::Structure,
    ];

    /// The RFC 4506 name of the category.
    pub const fn name(self) -> &'static str {
        match self {
            Tag::Boolean => "Boolean",
            Tag::Integer => "Integer",
            Tag::UnsignedInteger => "Unsigned Integer",
            Tag::Enumeration => "Enumeration",
            Tag::HyperInteger => "Hyper Integer",
            Tag::UnsignedHyperInteger => "Unsigned Hyper Integer",
            Tag::FixedLengthOpaqueData => "Fixed-Length Opaque Data",
            Tag::FixedLengthArray => "Fixed-Length Array",
            Tag::VariableLengthOpaqueData => "Variable-Length Opaque Data",
            Tag::String => "String",
            Tag::VariableLengthArray => "Variable-Length Array",
            Tag::Structure => "Structure",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string is not one of the RFC 4506 category names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown XDR tag {:?}", self.0)
    }
}

impl std::error::Error for UnknownTag {}

impl FromStr for Tag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Tag::ALL
            .into_iter()
            .find(|tag| tag.name() == s)
            .ok_or_else(|| UnknownTag(s.to_owned()))
    }
}

/// Whether a value of shape `kind` may be declared as `tag`.
pub fn accepts(kind: Kind, tag: Tag) -> bool {
    matches!(
        (kind, tag),
        (Kind::Boolean, Tag::Boolean)
            | (Kind::SignedInt32, Tag::Integer | Tag::Enumeration)
            | (Kind::UnsignedInt32, Tag::UnsignedInteger | Tag::Enumeration)
            | (Kind::SignedInt64, Tag::HyperInteger)
            | (Kind::UnsignedInt64, Tag::UnsignedHyperInteger)
            | (Kind::FixedByteArray, Tag::FixedLengthOpaqueData)
            | (Kind::FixedAggregateArray, Tag::FixedLengthArray)
            | (
                Kind::VariableByteSequence,
                Tag::VariableLengthOpaqueData | Tag::String
            )
            | (Kind::TextString, Tag::String)
            | (Kind::VariableAggregateSequence, Tag::VariableLengthArray)
            | (Kind::Aggregate, Tag::Structure)
            | (Kind::Indirection, _)
    )
}

/// Validate `kind` against the declared `tag` of `field`.
///
/// Untagged positions (array elements and the root value) accept any shape.
pub fn check_tag(field: &'static str, kind: Kind, tag: Option<Tag>) -> Result<()> {
    match tag {
        Some(tag) if !accepts(kind, tag) => Err(Error::TagMismatch { field, kind, tag }),
        _ => Ok(()),
    }
}

/// Round a byte count up to the next multiple of 4.
pub const fn round_up4(n: u64) -> u64 {
    n.div_ceil(4) * 4
}

/// Check `len` against the declared bound, or the XDR ceiling when undeclared.
pub fn check_length(field: &'static str, len: u64, bound: Option<u64>) -> Result<()> {
    let max = bound.unwrap_or(MAX_LENGTH);
    if len > max {
        return Err(Error::LengthOverflow {
            field,
            max,
            got: len,
        });
    }
    Ok(())
}

/// Encoded size of variable-length opaque data or a string of `len` bytes.
pub const fn opaque_size(len: u64) -> u64 {
    if len == 0 { 4 } else { 4 + round_up4(len) }
}
