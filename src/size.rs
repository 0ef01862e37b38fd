//! XDR size calculation.
//!
//! [`Examiner`] is a serde serializer that produces no bytes. Every
//! `serialize_*` call returns the encoded size of the value it was given,
//! after checking the value's shape against the tag and bound declared for
//! the position it occupies. [`pack`](crate::pack) runs it to completion
//! before writing anything, so every structural error surfaces here.

use crate::error::{Error, Result};
use crate::layout::{Describe, Layout, Slot};
use crate::shape::{self, Kind, Tag, check_length, check_tag, opaque_size, round_up4};
use serde::ser::{self, Impossible, Serialize};

/// Number of bytes `value` encodes to, using the layout its type describes.
pub fn examine<T: Serialize + Describe + ?Sized>(value: &T) -> Result<u64> {
    examine_with(value, T::LAYOUT)
}

/// Number of bytes `value` encodes to, using an explicitly supplied layout.
pub fn examine_with<T: Serialize + ?Sized>(
    value: &T,
    layout: Option<&'static Layout>,
) -> Result<u64> {
    if let Some(layout) = layout {
        layout.validate()?;
    }
    let mut examiner = Examiner::new(layout);
    let size = value
        .serialize(&mut examiner)
        .inspect_err(|e| log::debug!("examine rejected {}: {e}", std::any::type_name::<T>()))?;
    log::trace!("examined {}: {size} bytes", std::any::type_name::<T>());
    Ok(size)
}

/// Size-computing serializer. Obtain one via [`examine`] / [`examine_with`].
pub struct Examiner {
    slot: Slot,
    fixed_opaque: bool,
    saw_byte: bool,
}

impl Examiner {
    fn new(layout: Option<&'static Layout>) -> Self {
        Examiner {
            slot: Slot::root(layout),
            fixed_opaque: false,
            saw_byte: false,
        }
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

    fn variable_opaque(&self, kind: Kind, len: usize) -> Result<u64> {
        self.check(kind)?;
        let len = len as u64;
        if len != 0 {
            check_length(self.slot.field, len, self.slot.bound)?;
        }
        Ok(opaque_size(len))
    }

    fn sequence(&mut self, len: usize, variable: bool) -> Result<SeqExaminer<'_>> {
        let (byte_kind, item_kind) = if variable {
            (Kind::VariableByteSequence, Kind::VariableAggregateSequence)
        } else {
            (Kind::FixedByteArray, Kind::FixedAggregateArray)
        };
        if let Some(tag) = self.slot.tag {
            if !shape::accepts(byte_kind, tag) && !shape::accepts(item_kind, tag) {
                return Err(Error::TagMismatch {
                    field: self.slot.field,
                    kind: item_kind,
                    tag,
                });
            }
        }
        if variable {
            if len != 0 {
                check_length(self.slot.field, len as u64, self.slot.bound)?;
            }
        } else if len == 0 {
            return Err(self.unsupported("zero-length fixed array"));
        }
        Ok(SeqExaminer {
            elem: self.slot.element(byte_kind),
            field: self.slot.field,
            tag: self.slot.tag,
            byte_kind,
            item_kind,
            bytes: None,
            prefix: if variable { 4 } else { 0 },
            count: 0,
            total: 0,
            examiner: self,
        })
    }

    fn aggregate(&mut self, name: &'static str, len: usize, named: bool) -> Result<StructExaminer<'_>> {
        self.check(Kind::Aggregate)?;
        let layout = self.slot.layout.ok_or(Error::MissingLayout {
            field: self.slot.field,
            name,
        })?;
        layout.check_count(len)?;
        Ok(StructExaminer {
            examiner: self,
            layout,
            named,
            index: 0,
            total: 0,
        })
    }
}

impl<'a> ser::Serializer for &'a mut Examiner {
    type Ok = u64;
    type Error = Error;

    type SerializeSeq = SeqExaminer<'a>;
    type SerializeTuple = SeqExaminer<'a>;
    type SerializeTupleStruct = StructExaminer<'a>;
    type SerializeTupleVariant = Impossible<u64, Error>;
    type SerializeMap = Impossible<u64, Error>;
    type SerializeStruct = StructExaminer<'a>;
    type SerializeStructVariant = Impossible<u64, Error>;

    fn serialize_bool(self, _v: bool) -> Result<u64> {
        self.check(Kind::Boolean)?;
        Ok(4)
    }

    fn serialize_i32(self, _v: i32) -> Result<u64> {
        self.check(Kind::SignedInt32)?;
        Ok(4)
    }

    fn serialize_i64(self, _v: i64) -> Result<u64> {
        self.check(Kind::SignedInt64)?;
        Ok(8)
    }

    fn serialize_u32(self, _v: u32) -> Result<u64> {
        self.check(Kind::UnsignedInt32)?;
        Ok(4)
    }

    fn serialize_u64(self, _v: u64) -> Result<u64> {
        self.check(Kind::UnsignedInt64)?;
        Ok(8)
    }

    /// One raw byte of opaque data; only meaningful inside an array.
    fn serialize_u8(self, _v: u8) -> Result<u64> {
        if self.slot.element.is_none() {
            return Err(self.unsupported("u8 outside opaque data"));
        }
        self.saw_byte = true;
        Ok(1)
    }

    fn serialize_i8(self, _v: i8) -> Result<u64> {
        Err(self.unsupported("i8"))
    }
    fn serialize_i16(self, _v: i16) -> Result<u64> {
        Err(self.unsupported("i16"))
    }
    fn serialize_u16(self, _v: u16) -> Result<u64> {
        Err(self.unsupported("u16"))
    }
    fn serialize_f32(self, _v: f32) -> Result<u64> {
        Err(self.unsupported("f32"))
    }
    fn serialize_f64(self, _v: f64) -> Result<u64> {
        Err(self.unsupported("f64"))
    }
    fn serialize_char(self, _v: char) -> Result<u64> {
        Err(self.unsupported("char"))
    }

    fn serialize_str(self, v: &str) -> Result<u64> {
        self.variable_opaque(Kind::TextString, v.len())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<u64> {
        if std::mem::take(&mut self.fixed_opaque) {
            self.check(Kind::FixedByteArray)?;
            if v.is_empty() {
                return Err(self.unsupported("zero-length fixed array"));
            }
            return Ok(round_up4(v.len() as u64));
        }
        self.variable_opaque(Kind::VariableByteSequence, v.len())
    }

    fn serialize_none(self) -> Result<u64> {
        Err(self.unsupported("optional data"))
    }
    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<u64> {
        Err(self.unsupported("optional data"))
    }
    fn serialize_unit(self) -> Result<u64> {
        Err(self.unsupported("void"))
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<u64> {
        Err(self.unsupported("void"))
    }
    fn serialize_unit_variant(self, _name: &'static str, _idx: u32, _var: &'static str) -> Result<u64> {
        Err(self.unsupported("enum variant"))
    }

    /// Newtype structs are transparent, like a pointer to their content.
    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, name: &'static str, value: &T) -> Result<u64> {
        self.check(Kind::Indirection)?;
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
    ) -> Result<u64> {
        Err(self.unsupported("enum variant"))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        let len = len.ok_or(Error::LengthRequired)?;
        self.sequence(len, true)
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.sequence(len, false)
    }

    fn serialize_tuple_struct(self, name: &'static str, len: usize) -> Result<Self::SerializeTupleStruct> {
        self.aggregate(name, len, false)
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

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.aggregate(name, len, true)
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

/// Sizes the elements of a fixed array or variable sequence.
///
/// Whether the elements are raw bytes or encoded items is learned from the
/// first element and must then hold for the rest.
pub struct SeqExaminer<'a> {
    examiner: &'a mut Examiner,
    elem: Slot,
    field: &'static str,
    tag: Option<Tag>,
    byte_kind: Kind,
    item_kind: Kind,
    bytes: Option<bool>,
    prefix: u64,
    count: u64,
    total: u64,
}

impl SeqExaminer<'_> {
    fn element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.examiner.slot = self.elem;
        self.examiner.saw_byte = false;
        let size = value.serialize(&mut *self.examiner)?;
        let is_byte = self.examiner.saw_byte;
        let kind = if is_byte { self.byte_kind } else { self.item_kind };
        match self.bytes {
            None => {
                check_tag(self.field, kind, self.tag)?;
                self.bytes = Some(is_byte);
            }
            Some(bytes) if bytes != is_byte => {
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
        }
        self.count += 1;
        self.total += size;
        Ok(())
    }

    fn finish(self) -> u64 {
        self.examiner.saw_byte = false;
        match self.bytes {
            Some(true) => self.prefix + round_up4(self.count),
            _ => self.prefix + self.total,
        }
    }
}

impl ser::SerializeSeq for SeqExaminer<'_> {
    type Ok = u64;
    type Error = Error;
    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }
    fn end(self) -> Result<u64> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqExaminer<'_> {
    type Ok = u64;
    type Error = Error;
    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }
    fn end(self) -> Result<u64> {
        Ok(self.finish())
    }
}

/// Sizes the fields of a structure, in layout order.
pub struct StructExaminer<'a> {
    examiner: &'a mut Examiner,
    layout: &'static Layout,
    named: bool,
    index: usize,
    total: u64,
}

impl StructExaminer<'_> {
    fn field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        let name = if self.named { Some(key) } else { None };
        let field = self.layout.field(self.index, name)?;
        self.examiner.slot = Slot::field(field)?;
        self.total += value.serialize(&mut *self.examiner)?;
        self.index += 1;
        Ok(())
    }
}

impl ser::SerializeStruct for StructExaminer<'_> {
    type Ok = u64;
    type Error = Error;
    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.field(key, value)
    }
    fn end(self) -> Result<u64> {
        self.examiner.saw_byte = false;
        Ok(self.total)
    }
}

impl ser::SerializeTupleStruct for StructExaminer<'_> {
    type Ok = u64;
    type Error = Error;
    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.field("", value)
    }
    fn end(self) -> Result<u64> {
        self.examiner.saw_byte = false;
        Ok(self.total)
    }
}
