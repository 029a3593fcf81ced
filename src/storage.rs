//! Storage owns golden files: reading the recorded content for a snapshot
//! identity and recording new content.
//!
//! [`GoldenStorage`] is the standard implementation, layered over a
//! [`fs::FileSystem`] backend (real or in-memory, optionally wrapped in a
//! [`cache::CachedFs`]).

pub mod cache;
pub mod fs;
pub mod golden;
pub mod store;

pub use cache::CachedFs;
pub use fs::{FileSystem, MemFs, OsFs};
pub use golden::{GoldenFile, SnapshotMap, FORMAT_VERSION};
pub use store::GoldenStorage;

use crate::errors::Result;
use crate::identity::SnapshotId;

pub trait Storage: Send + Sync {
    /// Recorded content for `id`. A missing file or a missing entry is
    /// [`crate::SnapshotError::NotFound`].
    fn read(&self, id: &SnapshotId) -> Result<String>;

    /// Records `content` for `id`, leaving every other entry of the file
    /// untouched.
    fn write(&self, id: &SnapshotId, content: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn read(&self, id: &SnapshotId) -> Result<String> {
        (**self).read(id)
    }

    fn write(&self, id: &SnapshotId, content: &str) -> Result<()> {
        (**self).write(id, content)
    }
}
