//! Golden file codec.
//!
//! A golden file is a YAML document holding a format version and an ordered
//! map from snapshot name to recorded text:
//!
//! ```yaml
//! version: 1
//! snapshots:
//!   matcher::tests::records: |
//!     [
//!         1,
//!     ]
//! ```
//!
//! Only [`FORMAT_VERSION`] is accepted. Any other version, an unknown field,
//! a duplicate snapshot name or malformed YAML is a corrupt file; there is no
//! migration.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

use crate::errors::{Result, SnapshotError};

pub const FORMAT_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoldenFile {
    pub version: u64,
    #[serde(default)]
    pub snapshots: SnapshotMap,
}

impl Default for GoldenFile {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            snapshots: SnapshotMap::default(),
        }
    }
}

/// Snapshot name to content, in insertion order. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotMap(Vec<(String, String)>);

impl SnapshotMap {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, content)| content.as_str())
    }

    /// Overwrites an existing entry in place or appends a new one. Returns the
    /// previous content.
    pub fn upsert(&mut self, name: &str, content: &str) -> Option<String> {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, content.to_string())),
            None => {
                self.0.push((name.to_string(), content.to_string()));
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }
}

impl Serialize for SnapshotMap {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.0.len()))?;
        for (name, content) in &self.0 {
            map.serialize_entry(name, content)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SnapshotMap {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        struct SnapshotMapVisitor;

        impl<'de> Visitor<'de> for SnapshotMapVisitor {
            type Value = SnapshotMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of snapshot names to recorded content")
            }

            fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<SnapshotMap, E> {
                Ok(SnapshotMap::default())
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<SnapshotMap, A::Error> {
                let mut map = SnapshotMap::default();
                while let Some((name, content)) = access.next_entry::<String, String>()? {
                    if map.get(&name).is_some() {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate snapshot name {name:?}"
                        )));
                    }
                    map.0.push((name, content));
                }
                Ok(map)
            }
        }

        d.deserialize_any(SnapshotMapVisitor)
    }
}

// ============================================================================
// ENCODE / DECODE
// ============================================================================

/// Decodes a golden file. Empty input is an empty current-version file.
pub fn decode(path: &Path, bytes: &[u8]) -> Result<GoldenFile> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| SnapshotError::corrupt(path, format!("not valid UTF-8: {e}")))?;
    if text.trim().is_empty() {
        return Ok(GoldenFile::default());
    }

    let doc: serde_yaml::Value = serde_yaml::from_str(text)
        .map_err(|e| SnapshotError::corrupt(path, format!("malformed YAML: {e}")))?;
    check_version(path, &doc)?;
    serde_yaml::from_value(doc)
        .map_err(|e| SnapshotError::corrupt(path, format!("malformed golden file: {e}")))
}

fn check_version(path: &Path, doc: &serde_yaml::Value) -> Result<()> {
    let version = doc
        .as_mapping()
        .ok_or_else(|| SnapshotError::corrupt(path, "top level is not a mapping"))?
        .get("version")
        .ok_or_else(|| SnapshotError::corrupt(path, "missing format version"))?;
    match version.as_u64() {
        Some(FORMAT_VERSION) => Ok(()),
        Some(other) => Err(SnapshotError::corrupt(
            path,
            format!("unsupported format version {other} (expected {FORMAT_VERSION})"),
        )),
        None => Err(SnapshotError::corrupt(
            path,
            format!("format version is not an integer: {version:?}"),
        )),
    }
}

pub fn encode(file: &GoldenFile) -> Result<Vec<u8>> {
    serde_yaml::to_string(file)
        .map(String::into_bytes)
        .map_err(|e| SnapshotError::serialize("golden file", e))
}
