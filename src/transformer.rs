//! Transformers normalise a captured value before it is serialized.
//!
//! They exist so fields that change from run to run (timestamps, random IDs)
//! can be redacted before they break snapshot determinism.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::{Result, SnapshotError};
use crate::value::Value;

pub trait Transformer: Send + Sync {
    fn transform(&self, value: Value) -> Result<Value>;
}

impl<F> Transformer for F
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    fn transform(&self, value: Value) -> Result<Value> {
        self(value)
    }
}

/// Returns the value unchanged. The default transformer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transformer for Identity {
    fn transform(&self, value: Value) -> Result<Value> {
        Ok(value)
    }
}

/// Replaces the value of every struct field or string-keyed map entry with a
/// matching name, at any depth, by a fixed placeholder string.
///
/// # Examples
///
/// ```rust
/// use goldsnap::transformer::{Redact, Transformer};
/// use goldsnap::value::{to_value, Value};
///
/// let redact = Redact::new().field("created_at", "[timestamp]");
/// let value = to_value(&serde_json::json!({"created_at": 1712, "id": 3})).unwrap();
/// let Value::Map(entries) = redact.transform(value).unwrap() else { panic!() };
/// assert_eq!(entries[0].1, Value::String("[timestamp]".into()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Redact {
    fields: BTreeMap<String, String>,
    strict: bool,
}

impl Redact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, placeholder: impl Into<String>) -> Self {
        self.fields.insert(name.into(), placeholder.into());
        self
    }

    /// Fail with a transform error when a configured field never occurs,
    /// which catches redactions that silently stopped applying.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    fn walk(&self, value: Value, seen: &mut [bool]) -> Value {
        match value {
            Value::Some(inner) => Value::Some(Box::new(self.walk(*inner, seen))),
            Value::NewtypeStruct(name, inner) => {
                Value::NewtypeStruct(name, Box::new(self.walk(*inner, seen)))
            }
            Value::NewtypeVariant(v, inner) => {
                Value::NewtypeVariant(v, Box::new(self.walk(*inner, seen)))
            }
            Value::Seq(items) => Value::Seq(self.walk_all(items, seen)),
            Value::Tuple(items) => Value::Tuple(self.walk_all(items, seen)),
            Value::TupleStruct(name, items) => Value::TupleStruct(name, self.walk_all(items, seen)),
            Value::TupleVariant(v, items) => Value::TupleVariant(v, self.walk_all(items, seen)),
            Value::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| {
                        let v = match k.as_key().and_then(|key| self.placeholder(key, seen)) {
                            Some(placeholder) => placeholder,
                            None => self.walk(v, seen),
                        };
                        (k, v)
                    })
                    .collect(),
            ),
            Value::Struct(name, fields) => Value::Struct(name, self.walk_fields(fields, seen)),
            Value::StructVariant(v, fields) => {
                Value::StructVariant(v, self.walk_fields(fields, seen))
            }
            scalar => scalar,
        }
    }

    fn walk_all(&self, items: Vec<Value>, seen: &mut [bool]) -> Vec<Value> {
        items.into_iter().map(|v| self.walk(v, seen)).collect()
    }

    fn walk_fields(
        &self,
        fields: Vec<(&'static str, Value)>,
        seen: &mut [bool],
    ) -> Vec<(&'static str, Value)> {
        fields
            .into_iter()
            .map(|(k, v)| match self.placeholder(k, seen) {
                Some(placeholder) => (k, placeholder),
                None => (k, self.walk(v, seen)),
            })
            .collect()
    }

    fn placeholder(&self, key: &str, seen: &mut [bool]) -> Option<Value> {
        let (idx, placeholder) = self
            .fields
            .iter()
            .enumerate()
            .find_map(|(i, (name, p))| (name == key).then_some((i, p)))?;
        seen[idx] = true;
        Some(Value::String(placeholder.clone()))
    }
}

impl Transformer for Redact {
    fn transform(&self, value: Value) -> Result<Value> {
        let mut seen = vec![false; self.fields.len()];
        let out = self.walk(value, &mut seen);
        if self.strict {
            let missing: Vec<&str> = self
                .fields
                .keys()
                .zip(&seen)
                .filter(|(_, hit)| !**hit)
                .map(|(name, _)| name.as_str())
                .collect();
            if !missing.is_empty() {
                return Err(SnapshotError::transform(format!(
                    "redacted field(s) not present: {}",
                    missing.join(", ")
                )));
            }
        }
        Ok(out)
    }
}

/// Sorts the elements of every sequence, at any depth, by
/// [`Value::canonical_cmp`].
///
/// serde hands sets over as plain sequences, so a `HashSet` arrives in a
/// different order on every run. Apply this (or capture a `BTreeSet`) when a
/// value contains one. Tuples keep their order, and so does every `Vec`
/// inside the value once this runs, so only use it where order is noise.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortSeqs;

impl SortSeqs {
    fn walk(value: Value) -> Value {
        match value {
            Value::Seq(items) => {
                let mut items: Vec<Value> = items.into_iter().map(Self::walk).collect();
                items.sort_by(|a, b| a.canonical_cmp(b));
                Value::Seq(items)
            }
            Value::Some(inner) => Value::Some(Box::new(Self::walk(*inner))),
            Value::NewtypeStruct(name, inner) => {
                Value::NewtypeStruct(name, Box::new(Self::walk(*inner)))
            }
            Value::NewtypeVariant(v, inner) => {
                Value::NewtypeVariant(v, Box::new(Self::walk(*inner)))
            }
            Value::Tuple(items) => Value::Tuple(items.into_iter().map(Self::walk).collect()),
            Value::TupleStruct(name, items) => {
                Value::TupleStruct(name, items.into_iter().map(Self::walk).collect())
            }
            Value::TupleVariant(v, items) => {
                Value::TupleVariant(v, items.into_iter().map(Self::walk).collect())
            }
            Value::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::walk(v)))
                    .collect(),
            ),
            Value::Struct(name, fields) => Value::Struct(
                name,
                fields.into_iter().map(|(k, v)| (k, Self::walk(v))).collect(),
            ),
            Value::StructVariant(v, fields) => Value::StructVariant(
                v,
                fields.into_iter().map(|(k, f)| (k, Self::walk(f))).collect(),
            ),
            scalar => scalar,
        }
    }
}

impl Transformer for SortSeqs {
    fn transform(&self, value: Value) -> Result<Value> {
        Ok(Self::walk(value))
    }
}

/// Applies transformers in order, stopping at the first failure.
#[derive(Clone, Default)]
pub struct Chain {
    steps: Vec<Arc<dyn Transformer>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: impl Transformer + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }
}

impl Transformer for Chain {
    fn transform(&self, value: Value) -> Result<Value> {
        self.steps
            .iter()
            .try_fold(value, |acc, step| step.transform(acc))
    }
}
