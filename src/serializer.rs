//! Serializers turn a captured [`Value`] into the text stored in a golden file.
//!
//! Every implementation must be deterministic: the same logical value always
//! produces byte-identical output. Map ordering is settled at capture time
//! (see [`crate::value`]); serializers only add formatting.

pub mod dump;
pub mod formats;
pub mod passthrough;

pub use dump::DumpSerializer;
pub use formats::{JsonSerializer, TomlSerializer, YamlSerializer};
pub use passthrough::StringSerializer;

use crate::errors::Result;
use crate::value::Value;

pub trait Serializer: Send + Sync {
    /// Short format name used in error messages and logs.
    fn format(&self) -> &'static str;

    fn serialize(&self, value: &Value) -> Result<String>;
}

impl<S: Serializer + ?Sized> Serializer for std::sync::Arc<S> {
    fn format(&self) -> &'static str {
        (**self).format()
    }

    fn serialize(&self, value: &Value) -> Result<String> {
        (**self).serialize(value)
    }
}
