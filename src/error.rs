use crate::shape::{Kind, Tag};
use serde::{de, ser};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while examining, packing or unpacking XDR data.
///
/// Every error is fatal to the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A custom error message from serde
    #[error("{0}")]
    Message(String),

    /// A field's runtime shape disagrees with its declared tag
    #[error("field `{field}`: {kind} cannot be declared as \"{tag}\"")]
    TagMismatch {
        field: &'static str,
        kind: Kind,
        tag: Tag,
    },

    /// A structure was reached without a layout describing its fields
    #[error("field `{field}`: no layout declared for structure (in `{name}`)")]
    MissingLayout {
        field: &'static str,
        name: &'static str,
    },

    /// The layout and the value disagree on the number of fields
    #[error("layout `{layout}` declares {expected} fields, value has {got}")]
    FieldCount {
        layout: &'static str,
        expected: usize,
        got: usize,
    },

    /// The layout and the value disagree on a field name
    #[error("layout `{layout}` expects field `{expected}`, value has `{got}`")]
    FieldName {
        layout: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    /// A declared maximum size is above the XDR ceiling of 0xFFFFFFFF
    #[error("field `{field}`: declared maximum size {declared} exceeds 0xFFFFFFFF")]
    InvalidBound { field: &'static str, declared: u64 },

    /// Data exceeded the effective maximum length
    #[error("field `{field}`: length {got} exceeds maximum {max}")]
    LengthOverflow {
        field: &'static str,
        max: u64,
        got: u64,
    },

    /// The input ended before the next item could be read
    #[error("no room for {kind} at offset {offset:#X}: need {needed} bytes, {remaining} remaining")]
    BufferTooSmall {
        kind: Kind,
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A padding byte was non-zero
    #[error("non-zero padding byte at offset {offset:#X}")]
    InvalidPadding { offset: usize },

    /// The boolean encoding was neither 0 nor 1
    #[error("invalid boolean encoding {value:#010X} at offset {offset:#X} (must be 0 or 1)")]
    InvalidBool { offset: usize, value: u32 },

    /// Structures and arrays nest deeper than the decoder allows
    #[error("nesting deeper than {max} levels at offset {offset:#X}")]
    DepthLimitExceeded { offset: usize, max: usize },

    /// A string payload was not UTF-8
    #[error("string at offset {offset:#X} is not valid UTF-8")]
    InvalidString { offset: usize },

    /// XDR has no encoding for this serde data model type
    #[error("field `{field}`: unsupported shape: {what}")]
    Unsupported {
        field: &'static str,
        what: &'static str,
    },

    /// A sequence length was not known ahead of time (XDR requires it)
    #[error("sequence length must be known before serialization (XDR requires a length prefix)")]
    LengthRequired,

    /// A sequence visitor stopped before reading every encoded element
    #[error("field `{field}`: {left} encoded elements left unread")]
    TrailingElements { field: &'static str, left: usize },

    /// The encoder wrote a different number of bytes than examined
    #[error("encoder wrote {written} bytes, examine reported {expected}")]
    SizeMismatch { expected: u64, written: u64 },

    /// An I/O error occurred during writing
    #[error("I/O error: {0}")]
    Io(String),
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
