//! Structural dump: the default, schema-free rendering.
//!
//! The output reads like pretty `Debug` output: one element per line, four
//! space indentation, trailing commas, type and variant names kept. Lengths,
//! capacities and addresses never appear, so the text is stable across runs.

use std::fmt::Write as _;

use super::Serializer;
use crate::errors::Result;
use crate::value::{Value, Variant};

const INDENT: &str = "    ";

/// Deterministic human-readable dump of arbitrary nested data.
///
/// Deterministic as long as the captured value is: a `HashSet` is a sequence
/// in iteration order, so pair it with [`crate::transformer::SortSeqs`].
///
/// # Examples
///
/// ```rust
/// use goldsnap::serializer::{DumpSerializer, Serializer};
/// use goldsnap::value::to_value;
///
/// let out = DumpSerializer.serialize(&to_value(&(1, "two")).unwrap()).unwrap();
/// assert_eq!(out, "(\n    1,\n    \"two\",\n)\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpSerializer;

impl Serializer for DumpSerializer {
    fn format(&self) -> &'static str {
        "dump"
    }

    fn serialize(&self, value: &Value) -> Result<String> {
        let mut out = String::new();
        DumpWriter {
            out: &mut out,
            pretty: true,
        }
        .value(value, 0);
        out.push('\n');
        Ok(out)
    }
}

/// Single-line rendering, used for map keys and `Value`'s `Display`.
pub fn write_compact(out: &mut String, value: &Value) {
    DumpWriter { out, pretty: false }.value(value, 0);
}

enum Entry<'v> {
    Item(&'v Value),
    Field(&'static str, &'v Value),
    Pair(&'v Value, &'v Value),
}

struct DumpWriter<'a> {
    out: &'a mut String,
    pretty: bool,
}

impl DumpWriter<'_> {
    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Unit => self.out.push_str("()"),
            Value::Bool(b) => self.scalar(b),
            Value::I64(n) => self.scalar(n),
            Value::U64(n) => self.scalar(n),
            Value::F32(n) => self.debug(n),
            Value::F64(n) => self.debug(n),
            Value::Char(c) => self.debug(c),
            Value::String(s) => self.debug(s),
            Value::Bytes(b) => {
                let _ = write!(self.out, "b\"{}\"", b.escape_ascii());
            }
            Value::None => self.out.push_str("None"),
            Value::Some(inner) => {
                self.out.push_str("Some(");
                self.value(inner, depth);
                self.out.push(')');
            }
            Value::UnitStruct(name) => self.out.push_str(name),
            Value::UnitVariant(v) => self.variant(v),
            Value::NewtypeStruct(name, inner) => {
                self.out.push_str(name);
                self.out.push('(');
                self.value(inner, depth);
                self.out.push(')');
            }
            Value::NewtypeVariant(v, inner) => {
                self.variant(v);
                self.out.push('(');
                self.value(inner, depth);
                self.out.push(')');
            }
            Value::Seq(items) => self.block("[", "]", false, depth, items.iter().map(Entry::Item)),
            Value::Tuple(items) => self.block("(", ")", false, depth, items.iter().map(Entry::Item)),
            Value::TupleStruct(name, items) => {
                self.out.push_str(name);
                self.block("(", ")", false, depth, items.iter().map(Entry::Item));
            }
            Value::TupleVariant(v, items) => {
                self.variant(v);
                self.block("(", ")", false, depth, items.iter().map(Entry::Item));
            }
            Value::Map(entries) => self.block(
                "{",
                "}",
                true,
                depth,
                entries.iter().map(|(k, v)| Entry::Pair(k, v)),
            ),
            Value::Struct(name, fields) => {
                self.out.push_str(name);
                self.out.push(' ');
                self.block(
                    "{",
                    "}",
                    true,
                    depth,
                    fields.iter().map(|(k, v)| Entry::Field(*k, v)),
                );
            }
            Value::StructVariant(v, fields) => {
                self.variant(v);
                self.out.push(' ');
                self.block(
                    "{",
                    "}",
                    true,
                    depth,
                    fields.iter().map(|(k, v)| Entry::Field(*k, v)),
                );
            }
        }
    }

    fn scalar(&mut self, v: impl std::fmt::Display) {
        let _ = write!(self.out, "{v}");
    }

    fn debug(&mut self, v: impl std::fmt::Debug) {
        let _ = write!(self.out, "{v:?}");
    }

    fn variant(&mut self, v: &Variant) {
        let _ = write!(self.out, "{}::{}", v.enum_name, v.name);
    }

    fn block<'v>(
        &mut self,
        open: &str,
        close: &str,
        braced: bool,
        depth: usize,
        entries: impl ExactSizeIterator<Item = Entry<'v>>,
    ) {
        self.out.push_str(open);
        if entries.len() == 0 {
            self.out.push_str(close);
            return;
        }
        if !self.pretty {
            if braced {
                self.out.push(' ');
            }
            for (i, entry) in entries.enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                self.entry(entry, depth);
            }
            if braced {
                self.out.push(' ');
            }
            self.out.push_str(close);
            return;
        }
        self.out.push('\n');
        for entry in entries {
            self.indent(depth + 1);
            self.entry(entry, depth + 1);
            self.out.push_str(",\n");
        }
        self.indent(depth);
        self.out.push_str(close);
    }

    fn entry(&mut self, entry: Entry<'_>, depth: usize) {
        match entry {
            Entry::Item(v) => self.value(v, depth),
            Entry::Field(key, v) => {
                self.out.push_str(key);
                self.out.push_str(": ");
                self.value(v, depth);
            }
            Entry::Pair(key, v) => {
                write_compact(self.out, key);
                self.out.push_str(": ");
                self.value(v, depth);
            }
        }
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }
}
