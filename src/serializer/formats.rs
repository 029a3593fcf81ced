//! Standard document formats: JSON, YAML and TOML.
//!
//! Useful when golden files should stay readable by other tools or be edited
//! by hand.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::Serializer;
use crate::errors::{Result, SnapshotError};
use crate::value::Value;

/// JSON encoding, pretty-printed unless `indent` is `None`. Output always ends
/// with a newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonSerializer {
    pub indent: Option<String>,
}

impl JsonSerializer {
    pub fn compact() -> Self {
        Self { indent: None }
    }

    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self {
            indent: Some(indent.into()),
        }
    }
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::with_indent("  ")
    }
}

impl Serializer for JsonSerializer {
    fn format(&self) -> &'static str {
        "json"
    }

    fn serialize(&self, value: &Value) -> Result<String> {
        let mut buf = Vec::new();
        match &self.indent {
            Some(indent) => {
                let formatter = PrettyFormatter::with_indent(indent.as_bytes());
                let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
                value
                    .serialize(&mut ser)
                    .map_err(|e| SnapshotError::serialize("json", e))?;
            }
            None => {
                serde_json::to_writer(&mut buf, value)
                    .map_err(|e| SnapshotError::serialize("json", e))?;
            }
        }
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| SnapshotError::serialize("json", e))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlSerializer;

impl Serializer for YamlSerializer {
    fn format(&self) -> &'static str {
        "yaml"
    }

    fn serialize(&self, value: &Value) -> Result<String> {
        serde_yaml::to_string(value).map_err(|e| SnapshotError::serialize("yaml", e))
    }
}

/// TOML encoding. The top-level value must be a table (a struct or a map
/// with string keys).
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlSerializer {
    pub pretty: bool,
}

impl Serializer for TomlSerializer {
    fn format(&self) -> &'static str {
        "toml"
    }

    fn serialize(&self, value: &Value) -> Result<String> {
        let encoded = if self.pretty {
            toml::to_string_pretty(value)
        } else {
            toml::to_string(value)
        };
        encoded.map_err(|e| SnapshotError::serialize("toml", e))
    }
}
