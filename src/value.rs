//! The captured form of a test value.
//!
//! Any `T: Serialize` is captured into a [`Value`] tree before it reaches a
//! transformer or serializer. The tree keeps type, field and variant names so
//! the structural dump can show them, and map entries are put in canonical
//! order at capture time so every output format is deterministic.

pub mod ser;

use serde::ser::{
    SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTuple,
    SerializeTupleStruct, SerializeTupleVariant,
};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use crate::errors::{Result, SnapshotError};

/// An enum variant as reported by serde.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub enum_name: &'static str,
    pub index: u32,
    pub name: &'static str,
}

/// A self-describing value tree.
///
/// Map entries are sorted on capture. Sequences keep the order serde hands
/// them over in, so sets with no defined order (`HashSet`) need
/// [`crate::transformer::SortSeqs`] or a `BTreeSet` to snapshot stably.
///
/// # Examples
///
/// ```rust
/// use goldsnap::value::{to_value, Value};
/// let v = to_value(&vec![1u8, 2]).unwrap();
/// assert_eq!(v, Value::Seq(vec![Value::U64(1), Value::U64(2)]));
/// assert_eq!(v.type_name(), "Seq");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Unit,
    Bool(bool),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    None,
    Some(Box<Value>),
    UnitStruct(&'static str),
    UnitVariant(Variant),
    NewtypeStruct(&'static str, Box<Value>),
    NewtypeVariant(Variant, Box<Value>),
    Seq(Vec<Value>),
    Tuple(Vec<Value>),
    TupleStruct(&'static str, Vec<Value>),
    TupleVariant(Variant, Vec<Value>),
    Map(Vec<(Value, Value)>),
    Struct(&'static str, Vec<(&'static str, Value)>),
    StructVariant(Variant, Vec<(&'static str, Value)>),
}

/// Captures any serializable value.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value
        .serialize(ser::ValueSerializer)
        .map_err(|e| SnapshotError::serialize("value capture", e))
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "Unit",
            Value::Bool(_) => "Bool",
            Value::I64(_) | Value::U64(_) => "Integer",
            Value::F32(_) | Value::F64(_) => "Float",
            Value::Char(_) => "Char",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::None | Value::Some(_) => "Option",
            Value::UnitStruct(_) | Value::NewtypeStruct(..) | Value::TupleStruct(..) => "Struct",
            Value::Struct(..) => "Struct",
            Value::UnitVariant(_)
            | Value::NewtypeVariant(..)
            | Value::TupleVariant(..)
            | Value::StructVariant(..) => "Variant",
            Value::Seq(_) => "Seq",
            Value::Tuple(_) => "Tuple",
            Value::Map(_) => "Map",
        }
    }

    /// Returns the text if this value was captured from a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the key as text when it can name a field.
    pub(crate) fn as_key(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::UnitVariant(v) => Some(v.name),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Unit => 0,
            Value::Bool(_) => 1,
            Value::I64(_) | Value::U64(_) | Value::F32(_) | Value::F64(_) => 2,
            Value::Char(_) => 3,
            Value::String(_) => 4,
            Value::Bytes(_) => 5,
            Value::None => 6,
            Value::Some(_) => 7,
            _ => 8,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::I64(n) => Some(*n as f64),
            Value::U64(n) => Some(*n as f64),
            Value::F32(n) => Some(*n as f64),
            Value::F64(n) => Some(*n),
            _ => None,
        }
    }

    /// Total order used to sort map keys.
    pub fn canonical_cmp(&self, other: &Value) -> Ordering {
        let by_rank = self.rank().cmp(&other.rank());
        if by_rank != Ordering::Equal {
            return by_rank;
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::I64(a), Value::I64(b)) => a.cmp(b),
            (Value::U64(a), Value::U64(b)) => a.cmp(b),
            (Value::I64(a), Value::U64(b)) => (*a as i128).cmp(&(*b as i128)),
            (Value::U64(a), Value::I64(b)) => (*a as i128).cmp(&(*b as i128)),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::Some(a), Value::Some(b)) => a.canonical_cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.to_string().cmp(&b.to_string()),
            },
        }
    }
}

impl fmt::Display for Value {
    /// Single-line rendering in the structural dump style.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        crate::serializer::dump::write_compact(&mut out, self);
        f.write_str(&out)
    }
}

// ============================================================================
// RE-ENCODING: Value as a serde source for the format serializers
// ============================================================================

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Unit => s.serialize_unit(),
            Value::Bool(b) => s.serialize_bool(*b),
            Value::I64(n) => s.serialize_i64(*n),
            Value::U64(n) => s.serialize_u64(*n),
            Value::F32(n) => s.serialize_f32(*n),
            Value::F64(n) => s.serialize_f64(*n),
            Value::Char(c) => s.serialize_char(*c),
            Value::String(v) => s.serialize_str(v),
            Value::Bytes(b) => s.serialize_bytes(b),
            Value::None => s.serialize_none(),
            Value::Some(v) => s.serialize_some(v.as_ref()),
            Value::UnitStruct(name) => s.serialize_unit_struct(name),
            Value::UnitVariant(v) => s.serialize_unit_variant(v.enum_name, v.index, v.name),
            Value::NewtypeStruct(name, inner) => s.serialize_newtype_struct(name, inner.as_ref()),
            Value::NewtypeVariant(v, inner) => {
                s.serialize_newtype_variant(v.enum_name, v.index, v.name, inner.as_ref())
            }
            Value::Seq(items) => {
                let mut seq = s.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Tuple(items) => {
                let mut tup = s.serialize_tuple(items.len())?;
                for item in items {
                    tup.serialize_element(item)?;
                }
                tup.end()
            }
            Value::TupleStruct(name, items) => {
                let mut tup = s.serialize_tuple_struct(name, items.len())?;
                for item in items {
                    tup.serialize_field(item)?;
                }
                tup.end()
            }
            Value::TupleVariant(v, items) => {
                let mut tup =
                    s.serialize_tuple_variant(v.enum_name, v.index, v.name, items.len())?;
                for item in items {
                    tup.serialize_field(item)?;
                }
                tup.end()
            }
            Value::Map(entries) => {
                let mut map = s.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Struct(name, fields) => {
                let mut st = s.serialize_struct(name, fields.len())?;
                for (k, v) in fields {
                    st.serialize_field(*k, v)?;
                }
                st.end()
            }
            Value::StructVariant(v, fields) => {
                let mut st =
                    s.serialize_struct_variant(v.enum_name, v.index, v.name, fields.len())?;
                for (k, val) in fields {
                    st.serialize_field(*k, val)?;
                }
                st.end()
            }
        }
    }
}

/// Captures the wrapped value through its `Display` impl, so types that
/// render themselves as text are snapshotted as that text.
#[derive(Debug, Clone, Copy)]
pub struct Displayed<T>(pub T);

impl<T: fmt::Display> Serialize for Displayed<T> {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(&self.0)
    }
}
