//! Serde helper module for XDR fixed-length opaque data (RFC 4506 §4.9).
//!
//! Fixed-length opaque is a raw byte array whose size is known at compile
//! time, encoded as the bytes followed by 0–3 zero-padding bytes and **no
//! length prefix**. A `[u8; N]` field already encodes this way through serde's
//! tuple impls, but those stop at `N = 32`; this module covers any `N`.
//!
//! # Usage
//!
//! Annotate a `[u8; N]` field with `#[serde(with = "xdr_layout::fixed_opaque")]`
//! and declare it as `Fixed-Length Opaque Data`:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use xdr_layout::{Describe, Field, Layout, Tag, pack, unpack};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! pub struct Verifier {
//!     pub flavor: u32,
//!     #[serde(with = "xdr_layout::fixed_opaque")]
//!     pub body: [u8; 50],
//! }
//!
//! const VERIFIER: Layout = Layout::new(
//!     "Verifier",
//!     &[
//!         Field::of::<u32>("flavor", Tag::Enumeration),
//!         Field::of::<[u8; 50]>("body", Tag::FixedLengthOpaqueData),
//!     ],
//! );
//!
//! impl Describe for Verifier {
//!     const LAYOUT: Option<&'static Layout> = Some(&VERIFIER);
//! }
//!
//! let v = Verifier { flavor: 6, body: [0xAB; 50] };
//! let bytes = pack(&v).unwrap();
//! // 4 bytes (flavor) + 50 bytes (body) + 2 bytes padding
//! assert_eq!(bytes.len(), 56);
//! assert_eq!(&bytes[54..], [0, 0]);
//!
//! let mut decoded = Verifier { flavor: 0, body: [0; 50] };
//! assert_eq!(unpack(&bytes, &mut decoded).unwrap(), 56);
//! assert_eq!(v, decoded);
//! ```
//!
//! # Wire format
//!
//! ```text
//! +--------+--------+...+--------+---...---+
//! | byte 0 | byte 1 |...| byte N-1 |  r×0   |
//! +--------+--------+...+--------+---...---+
//! |<-----------N bytes---------->|<--pad--->|
//!                         where (N + r) % 4 == 0
//! ```

use serde::de::{Error as _, SeqAccess, Visitor};
use std::fmt;
use std::marker::PhantomData;

mod private {
    pub trait Sealed {}
}

/// Types that can be encoded as XDR fixed-length opaque data.
///
/// This trait is sealed; only `[u8; N]` implements it.
pub trait XdrFixedOpaque: private::Sealed + Sized {
    /// The byte length on the wire (before padding).
    const LEN: usize;
    /// Borrow the raw bytes.
    fn as_bytes(&self) -> &[u8];
    /// Construct from a slice of exactly `LEN` bytes.
    fn from_exact_bytes(bytes: &[u8]) -> Option<Self>;
}

impl<const N: usize> private::Sealed for [u8; N] {}

impl<const N: usize> XdrFixedOpaque for [u8; N] {
    const LEN: usize = N;
    fn as_bytes(&self) -> &[u8] {
        self.as_slice()
    }
    fn from_exact_bytes(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok()
    }
}

/// Serialize `value` as XDR fixed-length opaque: raw bytes + 0–3 padding.
pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: XdrFixedOpaque,
    S: serde::Serializer,
{
    // The token tells the XDR serializers that the bytes that follow have
    // no length prefix.
    serializer.serialize_newtype_struct(crate::FIXED_OPAQUE_TOKEN, &Raw(value.as_bytes()))
}

/// Deserialize XDR fixed-length opaque: exactly `LEN` bytes + padding.
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: XdrFixedOpaque,
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_tuple(T::LEN, FixedOpaqueVisitor::<T>(PhantomData))
}

struct Raw<'a>(&'a [u8]);

impl serde::Serialize for Raw<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}

struct FixedOpaqueVisitor<T>(PhantomData<T>);

impl<'de, T: XdrFixedOpaque> Visitor<'de> for FixedOpaqueVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fixed-length opaque ({} bytes)", T::LEN)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<T, A::Error> {
        let mut buf = Vec::with_capacity(T::LEN);
        while buf.len() < T::LEN {
            match seq.next_element::<u8>()? {
                Some(b) => buf.push(b),
                None => return Err(A::Error::invalid_length(buf.len(), &self)),
            }
        }
        T::from_exact_bytes(&buf).ok_or_else(|| A::Error::invalid_length(buf.len(), &self))
    }

    fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<T, E> {
        T::from_exact_bytes(v).ok_or_else(|| E::invalid_length(v.len(), &self))
    }
}
