//! Golden-file snapshot testing.
//!
//! A test hands a value to [`assert_golden!`]. The value is captured through
//! serde into a [`Value`] tree, optionally transformed, serialized to text and
//! compared with the text recorded under the test's name in a golden file.
//! When nothing is recorded yet (or `UPDATE_GOLDEN` is set) the text is
//! recorded and the assertion passes; otherwise any difference fails the test
//! with a line diff.
//!
//! Golden files live at `<fixture dir>/<prefix><source stem><suffix>`, by
//! default `testdata/<stem>.golden` relative to the crate root, and hold every
//! snapshot of one test file:
//!
//! ```yaml
//! version: 1
//! snapshots:
//!   tests::renders_page: |
//!     "<html>"
//! ```

pub mod config;
pub mod differ;
pub mod errors;
pub mod identity;
mod macros;
pub mod matcher;
pub mod serializer;
pub mod storage;
pub mod transformer;
pub mod value;

pub use config::Defaults;
pub use differ::{Differ, LineDiffer};
pub use errors::{ErrorKind, Result, SnapshotError};
pub use identity::{PathLayout, SnapshotId, TestLocation};
pub use matcher::{
    golden, with_color, with_description, with_differ, with_file_prefix, with_file_suffix,
    with_fixture_dir, with_serializer, with_storage, with_test_name, with_transformer,
    with_update, AssertionMatcher, MatchOption, Matcher, MatcherConfig,
};
pub use serializer::{
    DumpSerializer, JsonSerializer, Serializer, StringSerializer, TomlSerializer, YamlSerializer,
};
pub use storage::{CachedFs, FileSystem, GoldenStorage, MemFs, OsFs, Storage};
pub use transformer::{Chain, Identity, Redact, SortSeqs, Transformer};
pub use value::{to_value, Displayed, Value};

pub mod prelude {
    pub use crate::config::Defaults;
    pub use crate::differ::LineDiffer;
    pub use crate::errors::{ErrorKind, SnapshotError};
    pub use crate::identity::TestLocation;
    pub use crate::matcher::*;
    pub use crate::serializer::{
        DumpSerializer, JsonSerializer, StringSerializer, TomlSerializer, YamlSerializer,
    };
    pub use crate::storage::{GoldenStorage, MemFs, OsFs};
    pub use crate::transformer::{Chain, Redact, SortSeqs};
    pub use crate::{assert_golden, assert_not_golden, test_location};
}
