use std::sync::Arc;

use super::{DumpSerializer, Serializer};
use crate::errors::Result;
use crate::value::Value;

/// Stores text as-is, so string snapshots carry no quoting or escaping.
///
/// Strings and byte buffers (decoded as lossy UTF-8) are emitted verbatim;
/// every other value goes to `fallback`.
#[derive(Clone)]
pub struct StringSerializer {
    fallback: Arc<dyn Serializer>,
}

impl StringSerializer {
    pub fn new() -> Self {
        Self::with_fallback(DumpSerializer)
    }

    pub fn with_fallback(fallback: impl Serializer + 'static) -> Self {
        Self {
            fallback: Arc::new(fallback),
        }
    }
}

impl Default for StringSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StringSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringSerializer")
            .field("fallback", &self.fallback.format())
            .finish()
    }
}

impl Serializer for StringSerializer {
    fn format(&self) -> &'static str {
        "string"
    }

    fn serialize(&self, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Bytes(b) => Ok(String::from_utf8_lossy(b).into_owned()),
            other => self.fallback.serialize(other),
        }
    }
}
