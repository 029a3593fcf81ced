use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::fs::FileSystem;
use super::golden::{self, GoldenFile};
use super::Storage;
use crate::errors::{Result, SnapshotError};
use crate::identity::SnapshotId;

/// Golden-file storage over a filesystem backend.
///
/// Writes are read-modify-write of the whole file under a per-path lock, so
/// two snapshots sharing a file can be recorded concurrently without losing
/// either. The read half of that cycle always goes to the backing store, never
/// a cache. Reads take no lock; the backend's atomic writes guarantee they see
/// a complete file.
#[derive(Debug)]
pub struct GoldenStorage<F> {
    fs: F,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl<F: FileSystem> GoldenStorage<F> {
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Decodes the whole golden file at `path`.
    pub fn load(&self, path: &Path) -> Result<GoldenFile> {
        let bytes = self.fs.read(path).map_err(|e| io_error(path, e))?;
        golden::decode(path, &bytes)
    }

    /// Like [`Self::load`], but never served from a cache layer.
    fn load_uncached(&self, path: &Path) -> Result<GoldenFile> {
        let bytes = self.fs.read_uncached(path).map_err(|e| io_error(path, e))?;
        golden::decode(path, &bytes)
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        self.locks.lock().entry(lock_key(path)).or_default().clone()
    }
}

/// `testdata/a.golden` and `./testdata/a.golden` share one lock.
fn lock_key(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn io_error(path: &Path, e: io::Error) -> SnapshotError {
    if e.kind() == io::ErrorKind::NotFound {
        SnapshotError::not_found(path, "")
    } else {
        SnapshotError::io(path, e)
    }
}

impl<F: FileSystem> Storage for GoldenStorage<F> {
    fn read(&self, id: &SnapshotId) -> Result<String> {
        let file = match self.load(&id.path) {
            Err(SnapshotError::NotFound { .. }) => {
                debug!(snapshot = %id, "golden file does not exist");
                return Err(SnapshotError::not_found(&id.path, &id.name));
            }
            other => other?,
        };
        file.snapshots
            .get(&id.name)
            .map(str::to_string)
            .ok_or_else(|| SnapshotError::not_found(&id.path, &id.name))
    }

    fn write(&self, id: &SnapshotId, content: &str) -> Result<()> {
        let lock = self.lock_for(&id.path);
        let _guard = lock.lock();

        if let Some(parent) = id.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| SnapshotError::io(parent, e))?;
        }

        let mut file = match self.load_uncached(&id.path) {
            Err(SnapshotError::NotFound { .. }) => GoldenFile::default(),
            other => other?,
        };
        let previous = file.snapshots.upsert(&id.name, content);
        let bytes = golden::encode(&file)?;
        self.fs
            .write_atomic(&id.path, &bytes)
            .map_err(|e| SnapshotError::io(&id.path, e))?;

        info!(
            snapshot = %id,
            replaced = previous.is_some(),
            entries = file.snapshots.len(),
            "recorded snapshot"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::storage::cache::CachedFs;
    use crate::storage::fs::{MemFs, OsFs};
    use std::thread;
    use std::time::Duration;

    fn id(name: &str) -> SnapshotId {
        SnapshotId::new("testdata/store.golden", name)
    }

    #[test]
    fn missing_file_is_not_found() {
        let storage = GoldenStorage::new(MemFs::new());
        let err = storage.read(&id("a")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("\"a\""));
    }

    #[test]
    fn missing_entry_is_not_found() {
        let storage = GoldenStorage::new(MemFs::new());
        storage.write(&id("a"), "one").unwrap();
        assert_eq!(storage.read(&id("b")).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn write_creates_directories_and_keeps_other_entries() {
        let storage = GoldenStorage::new(MemFs::new());
        storage.write(&id("a"), "one\n").unwrap();
        storage.write(&id("b"), "two\n").unwrap();
        storage.write(&id("a"), "uno\n").unwrap();

        assert_eq!(storage.read(&id("a")).unwrap(), "uno\n");
        assert_eq!(storage.read(&id("b")).unwrap(), "two\n");
        let file = storage.load(Path::new("testdata/store.golden")).unwrap();
        let names: Vec<_> = file.snapshots.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn corrupt_files_are_never_overwritten() {
        let fs = MemFs::new();
        fs.insert("testdata/store.golden", "version: 9\nsnapshots: {}\n");
        let storage = GoldenStorage::new(fs);

        let err = storage.read(&id("a")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptGoldenFile);
        let err = storage.write(&id("a"), "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptGoldenFile);
        assert_eq!(
            storage.fs().contents(Path::new("testdata/store.golden")).unwrap(),
            b"version: 9\nsnapshots: {}\n"
        );
    }

    #[test]
    fn io_failures_are_storage_errors() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the golden file should be.
        let path = dir.path().join("taken.golden");
        std::fs::create_dir(&path).unwrap();
        let storage = GoldenStorage::new(OsFs);
        let err = storage.read(&SnapshotId::new(&path, "a")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageIo);
    }

    #[test]
    fn concurrent_writers_to_one_file_lose_nothing() {
        let storage = Arc::new(GoldenStorage::new(MemFs::new()));
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    storage
                        .write(&id(&format!("snap {i}")), &format!("content {i}\n"))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        for i in 0..16 {
            assert_eq!(
                storage.read(&id(&format!("snap {i}"))).unwrap(),
                format!("content {i}\n")
            );
        }
    }

    #[test]
    fn equivalent_paths_share_a_lock() {
        let storage = GoldenStorage::new(MemFs::new());
        let plain = storage.lock_for(Path::new("testdata/a.golden"));
        let dotted = storage.lock_for(Path::new("./testdata/./a.golden"));
        assert!(Arc::ptr_eq(&plain, &dotted));
        let other = storage.lock_for(Path::new("testdata/b.golden"));
        assert!(!Arc::ptr_eq(&plain, &other));
    }

    #[test]
    fn cached_stack_survives_concurrent_reads_and_writes() {
        let storage = Arc::new(GoldenStorage::new(CachedFs::new(
            MemFs::new(),
            Duration::from_secs(60),
        )));
        thread::scope(|scope| {
            for i in 0..8 {
                let storage = &storage;
                scope.spawn(move || {
                    storage
                        .write(&id(&format!("snap {i}")), &format!("content {i}\n"))
                        .unwrap();
                });
                scope.spawn(move || {
                    for _ in 0..50 {
                        let _ = storage.read(&id(&format!("snap {i}")));
                    }
                });
            }
        });
        for i in 0..8 {
            assert_eq!(
                storage.read(&id(&format!("snap {i}"))).unwrap(),
                format!("content {i}\n")
            );
        }
    }

    #[test]
    fn os_storage_writes_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep/dir/os.golden");
        let storage = GoldenStorage::new(OsFs);
        storage.write(&SnapshotId::new(&path, "t"), "hello\n").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("version: 1\n"), "{text}");
        assert_eq!(storage.read(&SnapshotId::new(&path, "t")).unwrap(), "hello\n");
    }
}
