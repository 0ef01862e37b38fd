//! XDR Serializer (RFC 4506)
//!
//! [`pack`] examines the value first and only then encodes it into a buffer
//! of exactly the examined size, so a value that fails validation never
//! produces a partial buffer. The [`Serializer`] itself does not re-check
//! tags or bounds.
//!
//! ## Wire format summary
//! - All values are big-endian (network byte order)
//! - All items are padded to a multiple of 4 bytes
//! - Integers: 4 bytes (signed or unsigned), Hyper: 8 bytes, two's complement
//! - Booleans: 4 bytes, 0 or 1
//! - Strings/Opaque: 4-byte length prefix + data + 0–3 zero-padding bytes
//! - Fixed opaque: data + 0–3 zero-padding bytes, no prefix
//! - Sequences: 4-byte count prefix + elements
//! - Structs/Fixed arrays: items encoded consecutively, no prefix

use crate::error::{Error, Result};
use crate::layout::{Describe, Layout, Slot};
use crate::size::examine_with;
use serde::ser::{self, Impossible, Serialize};
use std::io::Write;

// ── Public entry points ────────────────────────────────────────────────────

/// Serialize `value` into a freshly allocated `Vec<u8>` of XDR bytes.
pub fn pack<T: Serialize + Describe + ?Sized>(value: &T) -> Result<Vec<u8>> {
    pack_with(value, T::LAYOUT)
}

/// Like [`pack`], with an explicitly supplied layout.
pub fn pack_with<T: Serialize + ?Sized>(
    value: &T,
    layout: Option<&'static Layout>,
) -> Result<Vec<u8>> {
    let size = examine_with(value, layout)?;
    let len = buffer_len(size)?;
    let mut buf = vec![0u8; len];
    let mut ser = Serializer::new(&mut buf[..]);
    value.serialize(&mut ser)?;
    let left = ser.into_writer().len();
    if left != 0 {
        return Err(Error::SizeMismatch {
            expected: size,
            written: (len - left) as u64,
        });
    }
    log::trace!("packed {}: {len} bytes", std::any::type_name::<T>());
    Ok(buf)
}

/// Length of the in-memory buffer for `size` encoded bytes.
fn buffer_len(size: u64) -> Result<usize> {
    usize::try_from(size).map_err(|_| Error::LengthOverflow {
        field: Slot::ROOT_NAME,
        max: usize::MAX as u64,
        got: size,
    })
}

/// Examine `value`, then write its XDR bytes into `writer`.
///
/// Nothing is written when the value fails examination. Returns the number
/// of bytes written.
pub fn to_writer<W: Write, T: Serialize + Describe + ?Sized>(mut writer: W, value: &T) -> Result<u64> {
    let size = examine_with(value, T::LAYOUT)?;
    let mut ser = Serializer::new(&mut writer);
    value.serialize(&mut ser)?;
    if ser.written != size {
        return Err(Error::SizeMismatch {
            expected: size,
            written: ser.written,
        });
    }
    Ok(size)
}

// ── Serializer ─────────────────────────────────────────────────────────────

/// The XDR serializer. Generic over any `W: Write`.
///
/// ```rust
/// use xdr_layout::ser::Serializer;
/// use serde::Serialize;
///
/// let mut buf = [0u8; 4];
/// let mut ser = Serializer::new(&mut buf[..]);
/// (-1_000_000i32).serialize(&mut ser).unwrap();
/// assert_eq!(buf, [0xFF, 0xF0, 0xBD, 0xC0]);
/// ```
pub struct Serializer<W: Write> {
    writer: W,
    written: u64,
    /// Raw bytes written by the innermost open array so far.
    run: u64,
    fixed_opaque: bool,
}

impl<W: Write> Serializer<W> {
    /// Create a new serializer that writes into `writer`.
    pub fn new(writer: W) -> Self {
        Serializer {
            writer,
            written: 0,
            run: 0,
            fixed_opaque: false,
        }
    }

    /// Consume the serializer and return the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    // ── Internal helpers ───────────────────────────────────────────────────

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .map_err(|e| Error::Io(e.to_string()))?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn write_u32(&mut self, v: u32) -> Result<()> {
        self.write_all(&v.to_be_bytes())
    }

    fn write_padding(&mut self, len: u64) -> Result<()> {
        let remainder = (len % 4) as usize;
        if remainder != 0 {
            self.write_all(&[0u8; 3][..4 - remainder])?;
        }
        Ok(())
    }

    /// Write `bytes` followed by enough zero bytes to reach a 4-byte boundary.
    fn write_padded_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes)?;
        self.write_padding(bytes.len() as u64)
    }

    /// XDR variable-length opaque: 4-byte length + padded data.
    fn write_opaque_variable(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| Error::LengthOverflow {
            field: "",
            max: u32::MAX as u64,
            got: bytes.len() as u64,
        })?;
        self.write_u32(len)?;
        self.write_padded_bytes(bytes)
    }

    fn open_array(&mut self) {
        self.run = 0;
    }

    /// Pad the raw bytes of the array being closed, if it held any.
    fn close_array(&mut self) -> Result<()> {
        let run = std::mem::take(&mut self.run);
        self.write_padding(run)
    }

    fn unsupported(&self, what: &'static str) -> Error {
        Error::Unsupported { field: "", what }
    }
}

// ── serde::Serializer impl ─────────────────────────────────────────────────

impl<'a, W: Write> ser::Serializer for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Self;
    type SerializeStructVariant = Impossible<(), Error>;

    /// XDR Bool → 4-byte unsigned int: 0 (false) or 1 (true)
    fn serialize_bool(self, v: bool) -> Result<()> {
        self.write_u32(u32::from(v))
    }

    /// XDR signed integer: 4 bytes, big-endian, two's complement
    fn serialize_i32(self, v: i32) -> Result<()> {
        self.write_all(&v.to_be_bytes())
    }
    /// XDR hyper integer: 8 bytes, big-endian, two's complement
    fn serialize_i64(self, v: i64) -> Result<()> {
        self.write_all(&v.to_be_bytes())
    }

    /// XDR unsigned integer: 4 bytes, big-endian
    fn serialize_u32(self, v: u32) -> Result<()> {
        self.write_u32(v)
    }
    /// XDR unsigned hyper integer: 8 bytes, big-endian
    fn serialize_u64(self, v: u64) -> Result<()> {
        self.write_all(&v.to_be_bytes())
    }

    /// One raw byte of opaque data; the enclosing array pads the run.
    fn serialize_u8(self, v: u8) -> Result<()> {
        self.write_all(&[v])?;
        self.run += 1;
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<()> {
        Err(self.unsupported("i8"))
    }
    fn serialize_i16(self, _v: i16) -> Result<()> {
        Err(self.unsupported("i16"))
    }
    fn serialize_u16(self, _v: u16) -> Result<()> {
        Err(self.unsupported("u16"))
    }
    fn serialize_f32(self, _v: f32) -> Result<()> {
        Err(self.unsupported("f32"))
    }
    fn serialize_f64(self, _v: f64) -> Result<()> {
        Err(self.unsupported("f64"))
    }
    fn serialize_char(self, _v: char) -> Result<()> {
        Err(self.unsupported("char"))
    }

    /// XDR string: 4-byte length + bytes + 0–3 zero-padding bytes
    fn serialize_str(self, v: &str) -> Result<()> {
        self.write_opaque_variable(v.as_bytes())
    }

    /// XDR opaque: variable unless reached through the fixed-opaque token
    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        if std::mem::take(&mut self.fixed_opaque) {
            self.write_padded_bytes(v)
        } else {
            self.write_opaque_variable(v)
        }
    }

    fn serialize_none(self) -> Result<()> {
        Err(self.unsupported("optional data"))
    }
    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<()> {
        Err(self.unsupported("optional data"))
    }
    fn serialize_unit(self) -> Result<()> {
        Err(self.unsupported("void"))
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Err(self.unsupported("void"))
    }
    fn serialize_unit_variant(self, _name: &'static str, _idx: u32, _var: &'static str) -> Result<()> {
        Err(self.unsupported("enum variant"))
    }

    /// Newtype wrappers encode as their content
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<()> {
        if name == crate::FIXED_OPAQUE_TOKEN {
            self.fixed_opaque = true;
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _idx: u32,
        _var: &'static str,
        _value: &T,
    ) -> Result<()> {
        Err(self.unsupported("enum variant"))
    }

    /// XDR variable-length array or opaque → 4-byte element count + elements
    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        let l = len.ok_or(Error::LengthRequired)?;
        self.write_u32(l as u32)?;
        self.open_array();
        Ok(self)
    }

    /// XDR fixed-length array or opaque: elements without a length prefix
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        self.open_array();
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _idx: u32,
        _var: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.unsupported("enum variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(self.unsupported("map"))
    }

    /// XDR structure: fields encoded consecutively, no count prefix
    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _idx: u32,
        _var: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.unsupported("enum variant"))
    }
}

// ── Compound serializer impls ──────────────────────────────────────────────

macro_rules! forward_serialize_element {
    ($t:ty) => {
        impl<'a, W: Write> $t for &'a mut Serializer<W> {
            type Ok = ();
            type Error = Error;
            fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
                value.serialize(&mut **self)
            }
            fn end(self) -> Result<()> {
                self.close_array()
            }
        }
    };
}

forward_serialize_element!(ser::SerializeSeq);
forward_serialize_element!(ser::SerializeTuple);

impl<'a, W: Write> ser::SerializeTupleStruct for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;
    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }
    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeStruct for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;
    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }
    fn end(self) -> Result<()> {
        Ok(())
    }
}
