//! XDR Deserializer (RFC 4506)
//!
//! Decoding is driven by the destination type and checked against the tags
//! and bounds declared in its layout. Input is untrusted: every read is
//! preceded by a length check, every length prefix is bound-checked before
//! its payload is touched, and every padding byte must be zero.

use crate::error::{Error, Result};
use crate::layout::{Describe, Layout, Slot};
use crate::shape::{self, Kind, Tag, check_length, check_tag, round_up4};
use serde::de::{self, Deserialize, DeserializeOwned, SeqAccess, Visitor};

/// Deepest nesting of structures and arrays the decoder follows.
///
/// Self-referential layouts let the input choose its own depth, four bytes
/// per level, so decoding stops here instead of exhausting the stack.
pub const MAX_DEPTH: usize = 256;

/// Decode the prefix of `input` into `dest`, returning the bytes consumed.
///
/// On error `dest` is left as it was.
pub fn unpack<'de, T: Deserialize<'de> + Describe>(input: &'de [u8], dest: &mut T) -> Result<u64> {
    let (value, consumed) = unpack_with(input, T::LAYOUT)?;
    *dest = value;
    Ok(consumed)
}

/// Decode a value from the prefix of `input` with an explicitly supplied
/// layout. Returns the value and the number of bytes consumed.
pub fn unpack_with<'de, T: Deserialize<'de>>(
    input: &'de [u8],
    layout: Option<&'static Layout>,
) -> Result<(T, u64)> {
    if let Some(layout) = layout {
        layout.validate()?;
    }
    let mut de = Deserializer::new(input, layout);
    let value = T::deserialize(&mut de)
        .inspect_err(|e| log::debug!("unpack rejected {}: {e}", std::any::type_name::<T>()))?;
    log::trace!(
        "unpacked {}: {} of {} bytes",
        std::any::type_name::<T>(),
        de.pos,
        input.len()
    );
    Ok((value, de.pos as u64))
}

/// Deserialize a value from XDR bytes, ignoring anything after it.
pub fn from_bytes<T: DeserializeOwned + Describe>(input: &[u8]) -> Result<T> {
    unpack_with(input, T::LAYOUT).map(|(value, _)| value)
}

/// Deserialize a value from XDR bytes, also returning remaining unconsumed bytes.
pub fn from_bytes_partial<'de, T: Deserialize<'de> + Describe>(input: &'de [u8]) -> Result<(T, &'de [u8])> {
    let (value, consumed) = unpack_with(input, T::LAYOUT)?;
    Ok((value, &input[consumed as usize..]))
}

/// The XDR deserializer. Reads from a byte slice, maintaining a cursor position.
pub struct Deserializer<'de> {
    input: &'de [u8],
    pos: usize,
    slot: Slot,
    saw_byte: bool,
    depth: usize,
}

impl<'de> Deserializer<'de> {
    pub fn new(input: &'de [u8], layout: Option<&'static Layout>) -> Self {
        Deserializer {
            input,
            pos: 0,
            slot: Slot::root(layout),
            saw_byte: false,
            depth: 0,
        }
    }

    /// Enter one more level of nesting.
    fn descend(&mut self) -> Result<()> {
        if self.depth == MAX_DEPTH {
            return Err(Error::DepthLimitExceeded {
                offset: self.pos,
                max: MAX_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn check(&self, kind: Kind) -> Result<()> {
        check_tag(self.slot.field, kind, self.slot.tag)
    }

    fn unsupported(&self, what: &'static str) -> Error {
        Error::Unsupported {
            field: self.slot.field,
            what,
        }
    }

    /// Fail unless `n` more bytes are available.
    fn need(&self, n: u64, kind: Kind) -> Result<()> {
        let remaining = self.input.len() - self.pos;
        if n > remaining as u64 {
            return Err(Error::BufferTooSmall {
                kind,
                offset: self.pos,
                needed: usize::try_from(n).unwrap_or(usize::MAX),
                remaining,
            });
        }
        Ok(())
    }

    /// Consume exactly `N` bytes.
    fn take<const N: usize>(&mut self, kind: Kind) -> Result<[u8; N]> {
        self.need(N as u64, kind)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.input[self.pos..self.pos + N]);
        self.pos += N;
        Ok(bytes)
    }

    fn read_u32(&mut self, kind: Kind) -> Result<u32> {
        self.take::<4>(kind).map(u32::from_be_bytes)
    }

    fn read_u64(&mut self, kind: Kind) -> Result<u64> {
        self.take::<8>(kind).map(u64::from_be_bytes)
    }

    /// Consume `n` padding bytes, all of which must be zero.
    fn skip_padding(&mut self, n: usize, kind: Kind) -> Result<()> {
        self.need(n as u64, kind)?;
        let pad = &self.input[self.pos..self.pos + n];
        if let Some(i) = pad.iter().position(|&b| b != 0) {
            return Err(Error::InvalidPadding {
                offset: self.pos + i,
            });
        }
        self.pos += n;
        Ok(())
    }

    /// Read `len` bytes of data plus their 0–3 padding bytes.
    /// Returns a slice into the original input (zero-copy).
    fn read_padded_bytes(&mut self, len: usize, kind: Kind) -> Result<&'de [u8]> {
        self.need(round_up4(len as u64), kind)?;
        let data = &self.input[self.pos..self.pos + len];
        self.pos += len;
        self.skip_padding(round_up4(len as u64) as usize - len, kind)?;
        Ok(data)
    }

    /// Read a length prefix and check it against the effective bound.
    fn read_length(&mut self, kind: Kind) -> Result<usize> {
        let len = self.read_u32(kind)?;
        if len != 0 {
            check_length(self.slot.field, len as u64, self.slot.bound)?;
        }
        Ok(len as usize)
    }

    /// Read a variable-length opaque or string:
    /// 4-byte length n, then n bytes + padding.
    fn read_variable_opaque(&mut self, kind: Kind) -> Result<&'de [u8]> {
        self.check(kind)?;
        let len = self.read_length(kind)?;
        if len == 0 {
            return Ok(&[]);
        }
        self.read_padded_bytes(len, kind)
    }

    fn read_str(&mut self) -> Result<&'de str> {
        let offset = self.pos + 4;
        let bytes = self.read_variable_opaque(Kind::TextString)?;
        std::str::from_utf8(bytes).map_err(|_| Error::InvalidString { offset })
    }

    /// Decode a fixed array (`len` from the type) or a variable sequence.
    fn sequence<V: Visitor<'de>>(&mut self, fixed: Option<usize>, visitor: V) -> Result<V::Value> {
        self.descend()?;
        let value = self.sequence_elements(fixed, visitor);
        self.depth -= 1;
        value
    }

    fn sequence_elements<V: Visitor<'de>>(&mut self, fixed: Option<usize>, visitor: V) -> Result<V::Value> {
        let (byte_kind, item_kind) = match fixed {
            Some(_) => (Kind::FixedByteArray, Kind::FixedAggregateArray),
            None => (Kind::VariableByteSequence, Kind::VariableAggregateSequence),
        };
        let bytes = match self.slot.tag {
            None => None,
            Some(tag) if shape::accepts(byte_kind, tag) => Some(true),
            Some(tag) if shape::accepts(item_kind, tag) => Some(false),
            Some(tag) => {
                return Err(Error::TagMismatch {
                    field: self.slot.field,
                    kind: item_kind,
                    tag,
                });
            }
        };
        let len = match fixed {
            Some(0) => return Err(self.unsupported("zero-length fixed array")),
            Some(len) => len,
            None => self.read_length(item_kind)?,
        };
        if bytes == Some(true) {
            self.need(round_up4(len as u64), byte_kind)?;
        }
        let mut access = ElementAccess {
            elem: self.slot.element(byte_kind),
            field: self.slot.field,
            tag: self.slot.tag,
            byte_kind,
            item_kind,
            bytes,
            len,
            remaining: len,
            de: self,
        };
        let value = visitor.visit_seq(&mut access)?;
        if access.remaining != 0 {
            return Err(Error::TrailingElements {
                field: access.field,
                left: access.remaining,
            });
        }
        access.de.saw_byte = false;
        Ok(value)
    }

    /// Decode a structure field by field, in layout order.
    fn aggregate<V: Visitor<'de>>(
        &mut self,
        name: &'static str,
        fields: Option<&'static [&'static str]>,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.check(Kind::Aggregate)?;
        self.descend()?;
        let value = self.aggregate_fields(name, fields, len, visitor);
        self.depth -= 1;
        value
    }

    fn aggregate_fields<V: Visitor<'de>>(
        &mut self,
        name: &'static str,
        fields: Option<&'static [&'static str]>,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        let layout = self.slot.layout.ok_or(Error::MissingLayout {
            field: self.slot.field,
            name,
        })?;
        layout.check_count(len)?;
        let mut access = FieldAccess {
            de: self,
            layout,
            names: fields,
            index: 0,
        };
        let value = visitor.visit_seq(&mut access)?;
        access.de.saw_byte = false;
        Ok(value)
    }
}

// ── Main Deserializer impl ─────────────────────────────────────────────────

impl<'de> de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("self-describing value (XDR is not self-describing)"))
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.check(Kind::Boolean)?;
        let offset = self.pos;
        match self.take::<4>(Kind::Boolean)? {
            [0, 0, 0, 0] => visitor.visit_bool(false),
            [0, 0, 0, 1] => visitor.visit_bool(true),
            other => Err(Error::InvalidBool {
                offset,
                value: u32::from_be_bytes(other),
            }),
        }
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.check(Kind::SignedInt32)?;
        let raw = self.read_u32(Kind::SignedInt32)?;
        visitor.visit_i32(raw as i32)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.check(Kind::SignedInt64)?;
        let raw = self.read_u64(Kind::SignedInt64)?;
        visitor.visit_i64(raw as i64)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.check(Kind::UnsignedInt32)?;
        visitor.visit_u32(self.read_u32(Kind::UnsignedInt32)?)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.check(Kind::UnsignedInt64)?;
        visitor.visit_u64(self.read_u64(Kind::UnsignedInt64)?)
    }

    /// One raw byte of an opaque run; only meaningful inside an array.
    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let Some(kind) = self.slot.element else {
            return Err(self.unsupported("u8 outside opaque data"));
        };
        let [b] = self.take::<1>(kind)?;
        self.saw_byte = true;
        visitor.visit_u8(b)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("i8"))
    }

    fn deserialize_i16<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("i16"))
    }

    fn deserialize_u16<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("u16"))
    }

    fn deserialize_f32<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("f32"))
    }

    fn deserialize_f64<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("f64"))
    }

    fn deserialize_char<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("char"))
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_borrowed_str(self.read_str()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_borrowed_bytes(self.read_variable_opaque(Kind::VariableByteSequence)?)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("optional data"))
    }

    fn deserialize_unit<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("void"))
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value> {
        Err(self.unsupported("void"))
    }

    /// Newtype wrappers decode as their content.
    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.check(Kind::Indirection)?;
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.sequence(None, visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        // Fixed-length: no count prefix
        self.sequence(Some(len), visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.aggregate(name, None, len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("map"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        // XDR structure: fields in order, no count prefix
        self.aggregate(name, Some(fields), fields.len(), visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value> {
        Err(self.unsupported("enum variant"))
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("identifier"))
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("ignored value (XDR is not self-describing)"))
    }
}

// ── ElementAccess: arrays and sequences ────────────────────────────────────

/// Hands out the elements of a fixed array or variable sequence.
///
/// Elements are either raw bytes (`u8`) of an opaque run or encoded items;
/// a tag decides which up front, otherwise the first element does. After the
/// last raw byte the run's padding is consumed and checked.
struct ElementAccess<'a, 'de: 'a> {
    de: &'a mut Deserializer<'de>,
    elem: Slot,
    field: &'static str,
    tag: Option<Tag>,
    byte_kind: Kind,
    item_kind: Kind,
    bytes: Option<bool>,
    len: usize,
    remaining: usize,
}

impl<'de> SeqAccess<'de> for ElementAccess<'_, 'de> {
    type Error = Error;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        self.de.slot = self.elem;
        self.de.saw_byte = false;
        let value = seed.deserialize(&mut *self.de)?;
        let is_byte = std::mem::take(&mut self.de.saw_byte);
        match self.bytes {
            Some(bytes) if bytes != is_byte => {
                let kind = if is_byte { self.byte_kind } else { self.item_kind };
                return Err(match self.tag {
                    Some(tag) => Error::TagMismatch {
                        field: self.field,
                        kind,
                        tag,
                    },
                    None => Error::Unsupported {
                        field: self.field,
                        what: "array mixing raw bytes and items",
                    },
                });
            }
            Some(_) => {}
            None => self.bytes = Some(is_byte),
        }
        if is_byte && self.remaining == 0 {
            let pad = round_up4(self.len as u64) as usize - self.len;
            self.de.skip_padding(pad, self.byte_kind)?;
        }
        Ok(Some(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

// ── FieldAccess: structures ────────────────────────────────────────────────

/// Hands out the fields of a structure, each checked against its declaration.
struct FieldAccess<'a, 'de: 'a> {
    de: &'a mut Deserializer<'de>,
    layout: &'static Layout,
    names: Option<&'static [&'static str]>,
    index: usize,
}

impl<'de> SeqAccess<'de> for FieldAccess<'_, 'de> {
    type Error = Error;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        if self.index == self.layout.fields.len() {
            return Ok(None);
        }
        let name = self.names.map(|names| names[self.index]);
        let field = self.layout.field(self.index, name)?;
        // Declarations are static, but the destination gets no size pass,
        // so each one is re-checked as it is reached.
        self.de.slot = Slot::field(field)?;
        self.index += 1;
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.layout.fields.len() - self.index)
    }
}
