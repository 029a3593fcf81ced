//! `serde::Serializer` that captures values into a [`Value`] tree.

use serde::ser::{self, Serialize};
use std::fmt;

use super::{Value, Variant};

/// Error raised while capturing a value.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureError(String);

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CaptureError {}

impl ser::Error for CaptureError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CaptureError(msg.to_string())
    }
}

type Captured = Result<Value, CaptureError>;

pub struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = CaptureError;

    type SerializeSeq = SeqCollector;
    type SerializeTuple = SeqCollector;
    type SerializeTupleStruct = SeqCollector;
    type SerializeTupleVariant = SeqCollector;
    type SerializeMap = MapCollector;
    type SerializeStruct = StructCollector;
    type SerializeStructVariant = StructCollector;

    fn serialize_bool(self, v: bool) -> Captured {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Captured {
        Ok(Value::I64(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Captured {
        Ok(Value::I64(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Captured {
        Ok(Value::I64(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Captured {
        Ok(Value::I64(v))
    }

    fn serialize_i128(self, v: i128) -> Captured {
        if let Ok(n) = i64::try_from(v) {
            Ok(Value::I64(n))
        } else if let Ok(n) = u64::try_from(v) {
            Ok(Value::U64(n))
        } else {
            Err(CaptureError(format!("i128 value {v} does not fit in 64 bits")))
        }
    }

    fn serialize_u8(self, v: u8) -> Captured {
        Ok(Value::U64(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Captured {
        Ok(Value::U64(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Captured {
        Ok(Value::U64(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Captured {
        Ok(Value::U64(v))
    }

    fn serialize_u128(self, v: u128) -> Captured {
        u64::try_from(v)
            .map(Value::U64)
            .map_err(|_| CaptureError(format!("u128 value {v} does not fit in 64 bits")))
    }

    fn serialize_f32(self, v: f32) -> Captured {
        Ok(Value::F32(v))
    }

    fn serialize_f64(self, v: f64) -> Captured {
        Ok(Value::F64(v))
    }

    fn serialize_char(self, v: char) -> Captured {
        Ok(Value::Char(v))
    }

    fn serialize_str(self, v: &str) -> Captured {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Captured {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Captured {
        Ok(Value::None)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Captured {
        Ok(Value::Some(Box::new(value.serialize(ValueSerializer)?)))
    }

    fn serialize_unit(self) -> Captured {
        Ok(Value::Unit)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Captured {
        Ok(Value::UnitStruct(name))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
    ) -> Captured {
        Ok(Value::UnitVariant(variant_of(name, index, variant)))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Captured {
        Ok(Value::NewtypeStruct(
            name,
            Box::new(value.serialize(ValueSerializer)?),
        ))
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        value: &T,
    ) -> Captured {
        Ok(Value::NewtypeVariant(
            variant_of(name, index, variant),
            Box::new(value.serialize(ValueSerializer)?),
        ))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqCollector, CaptureError> {
        Ok(SeqCollector::new(SeqKind::Seq, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqCollector, CaptureError> {
        Ok(SeqCollector::new(SeqKind::Tuple, len))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<SeqCollector, CaptureError> {
        Ok(SeqCollector::new(SeqKind::TupleStruct(name), len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqCollector, CaptureError> {
        Ok(SeqCollector::new(
            SeqKind::TupleVariant(variant_of(name, index, variant)),
            len,
        ))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapCollector, CaptureError> {
        Ok(MapCollector {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<StructCollector, CaptureError> {
        Ok(StructCollector {
            kind: StructKind::Struct(name),
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<StructCollector, CaptureError> {
        Ok(StructCollector {
            kind: StructKind::Variant(variant_of(name, index, variant)),
            fields: Vec::with_capacity(len),
        })
    }
}

fn variant_of(enum_name: &'static str, index: u32, name: &'static str) -> Variant {
    Variant {
        enum_name,
        index,
        name,
    }
}

// ============================================================================
// COLLECTORS
// ============================================================================

enum SeqKind {
    Seq,
    Tuple,
    TupleStruct(&'static str),
    TupleVariant(Variant),
}

pub struct SeqCollector {
    kind: SeqKind,
    items: Vec<Value>,
}

impl SeqCollector {
    fn new(kind: SeqKind, len: usize) -> Self {
        Self {
            kind,
            items: Vec::with_capacity(len),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn finish(self) -> Captured {
        Ok(match self.kind {
            SeqKind::Seq => Value::Seq(self.items),
            SeqKind::Tuple => Value::Tuple(self.items),
            SeqKind::TupleStruct(name) => Value::TupleStruct(name, self.items),
            SeqKind::TupleVariant(variant) => Value::TupleVariant(variant, self.items),
        })
    }
}

impl ser::SerializeSeq for SeqCollector {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.push(value)
    }

    fn end(self) -> Captured {
        self.finish()
    }
}

impl ser::SerializeTuple for SeqCollector {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.push(value)
    }

    fn end(self) -> Captured {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SeqCollector {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.push(value)
    }

    fn end(self) -> Captured {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SeqCollector {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.push(value)
    }

    fn end(self) -> Captured {
        self.finish()
    }
}

pub struct MapCollector {
    entries: Vec<(Value, Value)>,
    pending_key: Option<Value>,
}

impl ser::SerializeMap for MapCollector {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), CaptureError> {
        self.pending_key = Some(key.serialize(ValueSerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CaptureError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| CaptureError("map value serialized before its key".to_string()))?;
        self.entries.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(mut self) -> Captured {
        // Stable sort: equal keys (only possible from a hand-written Serialize) keep input order.
        self.entries.sort_by(|(a, _), (b, _)| a.canonical_cmp(b));
        Ok(Value::Map(self.entries))
    }
}

enum StructKind {
    Struct(&'static str),
    Variant(Variant),
}

pub struct StructCollector {
    kind: StructKind,
    fields: Vec<(&'static str, Value)>,
}

impl StructCollector {
    fn push<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CaptureError> {
        self.fields.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn finish(self) -> Captured {
        Ok(match self.kind {
            StructKind::Struct(name) => Value::Struct(name, self.fields),
            StructKind::Variant(variant) => Value::StructVariant(variant, self.fields),
        })
    }
}

impl ser::SerializeStruct for StructCollector {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CaptureError> {
        self.push(key, value)
    }

    fn end(self) -> Captured {
        self.finish()
    }
}

impl ser::SerializeStructVariant for StructCollector {
    type Ok = Value;
    type Error = CaptureError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CaptureError> {
        self.push(key, value)
    }

    fn end(self) -> Captured {
        self.finish()
    }
}
