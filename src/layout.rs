//! Static field declarations for XDR structures.
//!
//! A [`Layout`] lists the fields of a structure in encoding order. Each
//! [`Field`] names the XDR category the field is declared as and, for
//! variable-length data, an optional maximum element count. Fields declared
//! with [`Field::of`] also record the shape of their Rust type, so a wrong
//! declaration is caught before any value is looked at:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use xdr_layout::{Describe, Field, Layout, Tag};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Lookup {
//!     dir: [u8; 8],
//!     name: String,
//! }
//!
//! const LOOKUP: Layout = Layout::new(
//!     "Lookup",
//!     &[
//!         Field::of::<[u8; 8]>("dir", Tag::FixedLengthOpaqueData),
//!         Field::of::<String>("name", Tag::String).max_size(255),
//!     ],
//! );
//!
//! impl Describe for Lookup {
//!     const LAYOUT: Option<&'static Layout> = Some(&LOOKUP);
//! }
//!
//! let bytes = xdr_layout::pack(&Lookup { dir: [7; 8], name: "etc".into() }).unwrap();
//! assert_eq!(bytes.len(), 8 + 4 + 4);
//! ```

use crate::error::{Error, Result};
use crate::shape::{Kind, MAX_LENGTH, Tag, check_tag};
use std::rc::Rc;
use std::sync::Arc;

/// Declaration of one structure field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub tag: Tag,
    /// Maximum element count for variable-length data; `None` means 0xFFFFFFFF.
    pub max_size: Option<u64>,
    /// Layout of the structure this field holds, directly or as array elements.
    pub layout: Option<&'static Layout>,
    /// Shape of the field's Rust type, when declared through [`Field::of`].
    pub kind: Option<Kind>,
}

impl Field {
    pub const fn new(name: &'static str, tag: Tag) -> Self {
        Field {
            name,
            tag,
            max_size: None,
            layout: None,
            kind: None,
        }
    }

    /// Declare a field holding a `T`, recording its shape and nested layout.
    ///
    /// The tag is then checked against the type once per call, whether or
    /// not the value has elements to look at.
    pub const fn of<T: Describe + ?Sized>(name: &'static str, tag: Tag) -> Self {
        Field {
            name,
            tag,
            max_size: None,
            layout: T::LAYOUT,
            kind: T::KIND,
        }
    }

    /// Declare a maximum element count.
    pub const fn max_size(mut self, max: u64) -> Self {
        self.max_size = Some(max);
        self
    }

    /// Attach the layout of the structure (or array element structure) held.
    pub const fn layout(mut self, layout: &'static Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// The declared bound, rejected when it cannot fit a length prefix.
    pub fn bound(&self) -> Result<Option<u64>> {
        match self.max_size {
            Some(declared) if declared > MAX_LENGTH => Err(Error::InvalidBound {
                field: self.name,
                declared,
            }),
            other => Ok(other),
        }
    }
}

/// Ordered field declarations of one structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl Layout {
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Layout { name, fields }
    }

    /// Check every field declaration reachable from this layout.
    ///
    /// Layouts may refer to themselves (a tree node holding an array of
    /// nodes); each layout is visited once.
    pub fn validate(&'static self) -> Result<()> {
        let mut seen: Vec<&'static Layout> = Vec::new();
        let mut pending = vec![self];
        while let Some(layout) = pending.pop() {
            if seen.iter().any(|l| std::ptr::eq(*l, layout)) {
                continue;
            }
            seen.push(layout);
            for field in layout.fields {
                field.bound()?;
                if let Some(kind) = field.kind {
                    check_tag(field.name, kind, Some(field.tag))?;
                }
                match field.layout {
                    Some(nested) => pending.push(nested),
                    None if field.tag == Tag::Structure => {
                        return Err(Error::MissingLayout {
                            field: field.name,
                            name: layout.name,
                        });
                    }
                    None => {}
                }
            }
        }
        Ok(())
    }

    pub(crate) fn check_count(&self, got: usize) -> Result<()> {
        if self.fields.len() != got {
            return Err(Error::FieldCount {
                layout: self.name,
                expected: self.fields.len(),
                got,
            });
        }
        Ok(())
    }

    pub(crate) fn field(&'static self, index: usize, name: Option<&'static str>) -> Result<&'static Field> {
        let field = self.fields.get(index).ok_or(Error::FieldCount {
            layout: self.name,
            expected: self.fields.len(),
            got: index + 1,
        })?;
        match name {
            Some(got) if got != field.name => Err(Error::FieldName {
                layout: self.name,
                expected: field.name,
                got,
            }),
            _ => Ok(field),
        }
    }
}

/// Types whose XDR shape and structure layout are known statically.
///
/// Scalars, strings and containers have no layout of their own; containers
/// forward the layout of their elements. Implement this for every structure
/// passed to [`examine`](crate::examine), [`pack`](crate::pack) or
/// [`unpack`](crate::unpack), and for structures declared through
/// [`Field::of`].
pub trait Describe {
    const LAYOUT: Option<&'static Layout> = None;

    /// The shape values of this type take, if it is always the same.
    const KIND: Option<Kind> = match Self::LAYOUT {
        Some(_) => Some(Kind::Aggregate),
        None => None,
    };

    /// Whether this type is one raw byte of opaque data inside arrays.
    const OPAQUE_BYTE: bool = false;
}

macro_rules! describe_leaf {
    ($($t:ty => $kind:ident),*) => {
        $(impl Describe for $t {
            const KIND: Option<Kind> = Some(Kind::$kind);
        })*
    };
}

describe_leaf!(
    bool => Boolean,
    i32 => SignedInt32,
    u32 => UnsignedInt32,
    i64 => SignedInt64,
    u64 => UnsignedInt64,
    str => TextString,
    String => TextString
);

impl Describe for u8 {
    const KIND: Option<Kind> = None;
    const OPAQUE_BYTE: bool = true;
}

macro_rules! describe_forward {
    ($($t:ty),*) => {
        $(impl<T: Describe + ?Sized> Describe for $t {
            const LAYOUT: Option<&'static Layout> = T::LAYOUT;
            const KIND: Option<Kind> = T::KIND;
        })*
    };
}

describe_forward!(Box<T>, Rc<T>, Arc<T>, &T);

const fn sequence_kind(opaque: bool) -> Option<Kind> {
    Some(if opaque {
        Kind::VariableByteSequence
    } else {
        Kind::VariableAggregateSequence
    })
}

impl<T: Describe> Describe for [T] {
    const LAYOUT: Option<&'static Layout> = T::LAYOUT;
    const KIND: Option<Kind> = sequence_kind(T::OPAQUE_BYTE);
}

impl<T: Describe> Describe for Vec<T> {
    const LAYOUT: Option<&'static Layout> = T::LAYOUT;
    const KIND: Option<Kind> = sequence_kind(T::OPAQUE_BYTE);
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    const LAYOUT: Option<&'static Layout> = T::LAYOUT;
    const KIND: Option<Kind> = Some(if T::OPAQUE_BYTE {
        Kind::FixedByteArray
    } else {
        Kind::FixedAggregateArray
    });
}

/// What the traversal knows about the position it is currently at.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot {
    pub field: &'static str,
    pub tag: Option<Tag>,
    pub bound: Option<u64>,
    pub layout: Option<&'static Layout>,
    /// Set inside arrays and sequences, where a `u8` is one raw byte of an
    /// opaque run; holds the kind to report for that run.
    pub element: Option<Kind>,
}

impl Slot {
    pub const ROOT_NAME: &'static str = "<root>";

    pub fn root(layout: Option<&'static Layout>) -> Self {
        Slot {
            field: Self::ROOT_NAME,
            tag: None,
            bound: None,
            layout,
            element: None,
        }
    }

    pub fn field(field: &'static Field) -> Result<Self> {
        Ok(Slot {
            field: field.name,
            tag: Some(field.tag),
            bound: field.bound()?,
            layout: field.layout,
            element: None,
        })
    }

    /// Slot of the elements of an array or sequence held at this slot.
    pub fn element(self, byte_kind: Kind) -> Self {
        Slot {
            tag: None,
            bound: None,
            element: Some(byte_kind),
            ..self
        }
    }
}
